//! Custom assertion macros
//!
//! Assertions for the shapes that come up repeatedly in the client tests:
//! results, navigation outcomes and display messages.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error, optionally of a given shape
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert that a navigation proceeds to the named route
#[macro_export]
macro_rules! assert_proceeds {
    ($navigation:expr, $name:expr) => {
        match $navigation {
            inquiry_circle::client::Navigation::Proceed(route) => assert_eq!(route.name, $name),
            other => panic!("Expected Proceed({}), got {:?}", $name, other),
        }
    };
}

/// Assert that a navigation redirects, returning the target location
#[macro_export]
macro_rules! assert_redirects {
    ($navigation:expr, $path:expr) => {
        match $navigation {
            inquiry_circle::client::Navigation::Redirect(location) => {
                assert_eq!(location.path, $path);
                location
            }
            other => panic!("Expected Redirect({}), got {:?}", $path, other),
        }
    };
}
