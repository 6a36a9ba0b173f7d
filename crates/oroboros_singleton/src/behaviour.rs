//! # Behaviours
//!
//! A behaviour is the data attached to a host object that the singleton
//! accessor manages. Behaviours carry no lifecycle logic of their own: the
//! host calls the registered hooks, not the behaviour.

/// Marker trait for behaviour types managed as singletons.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct AudioDirector {
///     keep_across_scenes: bool,
/// }
///
/// impl Behaviour for AudioDirector {
///     fn create() -> Self {
///         Self { keep_across_scenes: true }
///     }
///
///     fn persistent(&self) -> bool {
///         self.keep_across_scenes
///     }
/// }
/// ```
pub trait Behaviour: Send + Sync + 'static {
    /// Builds the behaviour attached to an object the accessor creates
    /// on demand.
    fn create() -> Self
    where
        Self: Sized;

    /// Whether the object should survive scene transitions.
    ///
    /// Set at authoring/construction time. Read once, when the object is
    /// bound as the singleton.
    fn persistent(&self) -> bool {
        false
    }

    /// Short type name used in diagnostics and for naming created objects.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Strips the module path from a type name, keeping generic arguments intact.
///
/// `game::audio::AudioDirector` becomes `AudioDirector`.
#[must_use]
pub fn short_type_name(full: &'static str) -> &'static str {
    let head = full.find('<').map_or(full, |generic_start| &full[..generic_start]);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
