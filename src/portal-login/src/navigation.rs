//! Route table and stack navigation.

use parking_lot::Mutex;
use tracing::debug;

/// Screens the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Login,
    Home,
    ForgotPassword,
    Register,
}

impl Route {
    /// Route name as registered with the navigator.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Home => "Home",
            Route::ForgotPassword => "ForgotPassword",
            Route::Register => "Register",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Navigation operations available to screens.
pub trait Navigator: Send + Sync {
    /// Push a route on top of the current one.
    fn navigate(&self, route: Route);

    /// Replace the current route, so "back" cannot return to it.
    fn replace(&self, route: Route);
}

/// In-memory navigation stack.
pub struct StackNavigator {
    stack: Mutex<Vec<Route>>,
}

impl StackNavigator {
    pub fn new(initial: Route) -> Self {
        Self {
            stack: Mutex::new(vec![initial]),
        }
    }

    /// Route currently on top.
    pub fn current(&self) -> Route {
        self.stack.lock().last().copied().unwrap_or_default()
    }

    /// Snapshot of the whole stack, bottom first.
    pub fn stack(&self) -> Vec<Route> {
        self.stack.lock().clone()
    }

    /// Pop the top route. The last remaining route is never popped.
    pub fn go_back(&self) -> bool {
        let mut stack = self.stack.lock();
        if stack.len() > 1 {
            stack.pop();
            true
        } else {
            false
        }
    }
}

impl Default for StackNavigator {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl Navigator for StackNavigator {
    fn navigate(&self, route: Route) {
        debug!(route = %route, "navigate");
        self.stack.lock().push(route);
    }

    fn replace(&self, route: Route) {
        debug!(route = %route, "replace");
        let mut stack = self.stack.lock();
        stack.pop();
        stack.push(route);
    }
}
