//! Exception handlers that swallow errors

use super::{static_regex, Detection, ScanContext, ScanRule};
use crate::RuleId;
use regex::Regex;

const MESSAGE: &str = "Empty catch block detected. Don't hide errors.";

/// Rule for detecting empty catch blocks and `except: pass`
pub struct EmptyErrorHandlerRule {
    except_pass: bool,
}

impl EmptyErrorHandlerRule {
    pub fn new() -> Self {
        Self { except_pass: true }
    }

    /// Whether `except ...: pass` counts as an empty handler
    pub fn with_except_pass(mut self, on: bool) -> Self {
        self.except_pass = on;
        self
    }

    /// `catch {}`, `catch (e) {}`, `catch (Exception ex) { }`
    fn catch_pattern() -> &'static Regex {
        static_regex!(r"\bcatch\b\s*(?:\([^)]*\))?\s*\{\s*\}")
    }

    /// `except: pass`, `except ValueError as e:\n    pass`, `except: ...`
    fn except_pattern() -> &'static Regex {
        static_regex!(r"\bexcept\b[^:\n]*:[ \t]*(?:#[^\n]*)?(?:\r?\n[ \t]*)?(?:pass\b|\.\.\.)")
    }
}

impl Default for EmptyErrorHandlerRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanRule for EmptyErrorHandlerRule {
    fn rules(&self) -> &'static [RuleId] {
        &[RuleId::EmptyErrorHandler]
    }

    fn check(&self, ctx: &ScanContext<'_>) -> Option<Detection> {
        let catch = Self::catch_pattern().find(ctx.text).map(|m| m.start());
        let except = if self.except_pass {
            Self::except_pattern().find(ctx.text).map(|m| m.start())
        } else {
            None
        };
        let offset = match (catch, except) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => a.or(b)?,
        };
        Some(Detection::new(RuleId::EmptyErrorHandler, offset, MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<Detection> {
        EmptyErrorHandlerRule::new().check(&ScanContext::new(text, ""))
    }

    #[test]
    fn empty_catch_blocks() {
        assert!(detect("try { go(); } catch (e) {}").is_some());
        assert!(detect("try { go(); } catch {}").is_some());
        assert!(detect("} catch (IOException ex) {\n\n}").is_some());
    }

    #[test]
    fn catch_with_body_passes() {
        assert!(detect("try { go(); } catch (e) { log(e); }").is_none());
        assert!(detect("promise.catch(handle)").is_none());
    }

    #[test]
    fn except_pass() {
        assert!(detect("try:\n    go()\nexcept:\n    pass\n").is_some());
        assert!(detect("except ValueError as e: pass").is_some());
        assert!(detect("except Exception:  # ignore\n    pass").is_some());
        assert!(detect("except KeyError:\n    ...").is_some());
    }

    #[test]
    fn except_with_handling_passes() {
        assert!(detect("except ValueError:\n    log(e)\n    pass\n").is_none());
        assert!(detect("except ValueError:\n    raise").is_none());
    }

    #[test]
    fn except_pass_can_be_turned_off() {
        let rule = EmptyErrorHandlerRule::new().with_except_pass(false);
        assert!(rule
            .check(&ScanContext::new("except:\n    pass", ""))
            .is_none());
        assert!(rule
            .check(&ScanContext::new("catch (e) {}", ""))
            .is_some());
    }

    #[test]
    fn earliest_handler_is_reported() {
        let text = "except:\n    pass\ntry {} catch (e) {}";
        assert_eq!(detect(text).unwrap().offset, 0);
    }
}
