//! Property tests for conference room names and passwords

use proptest::prelude::*;

use inquiry_circle::client::conference::{
    generate_room_name, generate_room_password, is_valid_room_name,
};

proptest! {
    #[test]
    fn generated_names_are_valid(circle in "[a-zA-Z0-9_-]{1,16}") {
        let name = generate_room_name(&circle, None);
        let prefix = format!("ic-{}-", circle);
        prop_assert!(name.starts_with(&prefix));
        prop_assert!(is_valid_room_name(&name));
    }

    #[test]
    fn session_suffix_is_truncated(circle in "[0-9]{1,6}", session in "[a-f0-9]{8,32}") {
        let name = generate_room_name(&circle, Some(&session));
        let suffix = format!("-{}", &session[..8]);
        prop_assert!(name.ends_with(&suffix));
        prop_assert!(is_valid_room_name(&name));
    }

    #[test]
    fn names_without_prefix_are_rejected(name in "[a-z0-9]{1,20}") {
        prop_assume!(!name.starts_with("ic"));
        prop_assert!(!is_valid_room_name(&name));
    }

    #[test]
    fn names_with_spaces_are_rejected(left in "[a-z0-9]{1,8}", right in "[a-z0-9]{1,8}") {
        let name = format!("ic-{} {}", left, right);
        prop_assert!(!is_valid_room_name(&name));
    }
}

#[test]
fn passwords_are_eight_uppercase_base36() {
    for _ in 0..64 {
        let password = generate_room_password();
        assert_eq!(password.len(), 8);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
