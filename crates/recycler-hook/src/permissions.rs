//! Hook points the recycler implements

/// Static declaration of the hook points a recycler uses
///
/// Deployment tooling checks this against the flags encoded in the hook
/// address.
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HookPermissions {
    pub before_initialize: bool,
    pub after_initialize: bool,
    pub before_add_liquidity: bool,
    pub after_add_liquidity: bool,
    pub before_remove_liquidity: bool,
    pub after_remove_liquidity: bool,
    pub before_swap: bool,
    pub after_swap: bool,
    pub before_donate: bool,
    pub after_donate: bool,
    pub before_swap_returns_delta: bool,
    pub after_swap_returns_delta: bool,
    pub after_add_liquidity_returns_delta: bool,
    pub after_remove_liquidity_returns_delta: bool,
}

impl HookPermissions {
    /// Permissions of the fee recycler: both swap hooks, both returning deltas
    pub const fn fee_recycler() -> Self {
        Self {
            before_initialize: false,
            after_initialize: false,
            before_add_liquidity: false,
            after_add_liquidity: false,
            before_remove_liquidity: false,
            after_remove_liquidity: false,
            before_swap: true,
            after_swap: true,
            before_donate: false,
            after_donate: false,
            before_swap_returns_delta: true,
            after_swap_returns_delta: true,
            after_add_liquidity_returns_delta: false,
            after_remove_liquidity_returns_delta: false,
        }
    }

    /// Names of the enabled hook points
    pub fn active_hook_points(&self) -> Vec<&'static str> {
        [
            (self.before_initialize, "before_initialize"),
            (self.after_initialize, "after_initialize"),
            (self.before_add_liquidity, "before_add_liquidity"),
            (self.after_add_liquidity, "after_add_liquidity"),
            (self.before_remove_liquidity, "before_remove_liquidity"),
            (self.after_remove_liquidity, "after_remove_liquidity"),
            (self.before_swap, "before_swap"),
            (self.after_swap, "after_swap"),
            (self.before_donate, "before_donate"),
            (self.after_donate, "after_donate"),
            (self.before_swap_returns_delta, "before_swap_returns_delta"),
            (self.after_swap_returns_delta, "after_swap_returns_delta"),
            (
                self.after_add_liquidity_returns_delta,
                "after_add_liquidity_returns_delta",
            ),
            (
                self.after_remove_liquidity_returns_delta,
                "after_remove_liquidity_returns_delta",
            ),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_recycler_hook_points() {
        assert_eq!(
            HookPermissions::fee_recycler().active_hook_points(),
            vec![
                "before_swap",
                "after_swap",
                "before_swap_returns_delta",
                "after_swap_returns_delta"
            ]
        );
        assert!(HookPermissions::default().active_hook_points().is_empty());
    }
}
