/// Default user label shown before a name is known
pub const DEFAULT_USER_NAME: &str = "User";

/// Shared display state for the top bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBar {
    circle_name: String,
    user_name: String,
}

impl Default for TopBar {
    fn default() -> Self {
        Self {
            circle_name: String::new(),
            user_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

impl TopBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circle_name(&self) -> &str {
        &self.circle_name
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn set_circle_name(&mut self, name: impl Into<String>) {
        self.circle_name = name.into();
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.user_name = name.into();
    }

    pub fn clear_circle_name(&mut self) {
        self.circle_name.clear();
    }
}
