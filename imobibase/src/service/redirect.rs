use smol_str::SmolStr;
use typed_builder::TypedBuilder;
use wegweiser::RedirectValidator;

/// Redirect target validation with a safe landing page to fall back to
#[derive(Clone, TypedBuilder)]
pub struct RedirectService {
    #[builder(setter(into))]
    fallback_path: SmolStr,
    validator: RedirectValidator,
}

impl RedirectService {
    #[must_use]
    pub fn validator(&self) -> &RedirectValidator {
        &self.validator
    }

    #[must_use]
    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    /// Validate `target`, falling back to the configured landing page
    ///
    /// Only the rejection code makes it into the log; the raw target stays
    /// out of the output entirely.
    #[must_use]
    pub fn safe_redirect(&self, target: &str) -> String {
        match self.validator.validate(target) {
            Ok(sanitized) => sanitized,
            Err(rejection) => {
                warn!(code = rejection.code(), "redirect target rejected");
                self.fallback_path.to_string()
            }
        }
    }

    /// [`Self::safe_redirect`] for optional targets
    #[must_use]
    pub fn safe_redirect_or_fallback(&self, target: Option<&str>) -> String {
        target.map_or_else(
            || self.fallback_path.to_string(),
            |target| self.safe_redirect(target),
        )
    }
}
