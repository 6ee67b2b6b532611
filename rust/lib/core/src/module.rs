use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (auth, translation, ...) implements this trait
/// to register its API endpoints. The binary entry point collects all
/// modules and merges their routes into a single Router. Paths are
/// absolute; modules must not register overlapping routes.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes, with state already applied.
    fn routes(&self) -> Router;
}
