pub use outreach_utils_derive::trace_instrument;

/// Version string reported by the cli and the server.
pub const fn outreach_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub trait Apply: Sized {
    /// Calls `f` with `self` and the contained value if `value` is `Some`,
    /// otherwise returns `self` unchanged.
    ///
    /// ```rust
    /// # use outreach_utils::Apply;
    /// let greeting = String::from("Hello").apply_map(Some("World"), |s, name| s + ", " + name);
    /// assert_eq!(greeting, "Hello, World");
    ///
    /// let greeting = String::from("Hello").apply_map(None::<&str>, |s, name| s + ", " + name);
    /// assert_eq!(greeting, "Hello");
    /// ```
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }
}

impl<T> Apply for T {}

/// Asserts that an expression matches a pattern, optionally followed by a
/// guard.
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat $(if $guard:expr)? $(,)?) => {
        match $expr {
            $pat $(if $guard)? => {}
            ref value => ::core::panic!(
                "assertion failed: `{:?}` does not match `{}`",
                value,
                ::core::stringify!($pat $(if $guard)?),
            ),
        }
    };
}
