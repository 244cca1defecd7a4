//! Matcher configuration.
//!
//! Supports both explicit configuration and environment variable fallbacks.

use bon::bon;

/// Switches for the matcher's optional search rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Retry `add`/`multiply` calls with the pattern arguments swapped.
    pub commutative: bool,
    /// Try the `divide`/`multiply` re-association rewrites when the callee fails to match.
    pub associative: bool,
    /// Follow variables to their bound values. Requires a bindings map.
    pub auto_jump: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { commutative: true, associative: true, auto_jump: false }
    }
}

#[bon]
impl MatchConfig {
    /// Create a match configuration with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default = true)] commutative: bool,
        #[builder(default = true)] associative: bool,
        #[builder(default = false)] auto_jump: bool,
    ) -> Self {
        Self { commutative, associative, auto_jump }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `DFPAT_NO_COMMUTATIVE` - Disable the swapped-argument retry if set
    /// * `DFPAT_NO_ASSOCIATIVE` - Disable the re-association rewrites if set
    pub fn from_env() -> Self {
        let commutative = std::env::var("DFPAT_NO_COMMUTATIVE").is_err();
        let associative = std::env::var("DFPAT_NO_ASSOCIATIVE").is_err();
        Self { commutative, associative, ..Default::default() }
    }

    /// Same configuration with auto-jump switched on.
    pub fn with_auto_jump(self) -> Self {
        Self { auto_jump: true, ..self }
    }
}
