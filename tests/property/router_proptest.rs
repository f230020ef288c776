//! Property tests for the navigation guard

use proptest::prelude::*;

use inquiry_circle::client::router::REDIRECT_PARAM;
use inquiry_circle::client::{
    ApiClient, MemorySessionStorage, Navigation, RouteTable, SessionStore,
};
use inquiry_circle::shared::AppConfig;

fn anonymous() -> SessionStore {
    let api = ApiClient::new(&AppConfig::default()).expect("client builds");
    SessionStore::new(api, Box::new(MemorySessionStorage::new()))
}

proptest! {
    #[test]
    fn circle_paths_capture_id(id in 1i64..1_000_000) {
        let routes = RouteTable::default_routes();
        let resolved = routes.resolve(&format!("/circles/{}", id)).expect("circle route");
        prop_assert_eq!(resolved.name.as_str(), "circle");
        let expected = id.to_string();
        prop_assert_eq!(resolved.params.get("id"), Some(&expected));
    }

    #[test]
    fn anonymous_visits_to_protected_pages_return_through_login(id in 1i64..10_000, session in 1i64..10_000) {
        let routes = RouteTable::default_routes();
        let mut store = anonymous();
        let target = format!("/circles/{}/translation/{}", id, session);

        match routes.guard(&target, &mut store) {
            Navigation::Redirect(location) => {
                prop_assert_eq!(location.path.as_str(), "/login");
                prop_assert_eq!(location.query_value(REDIRECT_PARAM), Some(target.as_str()));
            }
            other => prop_assert!(false, "expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn redirects_never_chain(path in prop::sample::select(vec![
        "/", "/login", "/facilitator", "/circles/1", "/circles/1/translation/2", "/test-conference",
    ])) {
        let routes = RouteTable::default_routes();
        let mut store = anonymous();

        if let Navigation::Redirect(location) = routes.guard(path, &mut store) {
            let second = routes.guard(&location.path, &mut store);
            prop_assert!(matches!(second, Navigation::Proceed(_)), "second hop was {:?}", second);
        }
    }
}
