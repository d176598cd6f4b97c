//! Macros for declaring event kinds.

/// Generate an [`EventKind`](crate::core::EventKind) enum.
///
/// Each variant's name defaults to the variant identifier; a string literal
/// after `=>` overrides it. The generated enum also gets `from_name` and an
/// `ALL` constant listing every variant.
///
/// # Example
///
/// ```
/// use taskfsm::event_kind;
/// use taskfsm::core::EventKind;
///
/// event_kind! {
///     pub enum PlayerEvent {
///         Started => "started",
///         Connected => "connected",
///         Track => "mpd.track",
///         Quit => "quit",
///     }
/// }
///
/// assert_eq!(PlayerEvent::Track.name(), "mpd.track");
/// assert_eq!(PlayerEvent::from_name("quit"), Some(PlayerEvent::Quit));
/// assert_eq!(PlayerEvent::ALL.len(), 4);
/// ```
#[macro_export]
macro_rules! event_kind {
    (@name $variant:ident) => {
        stringify!($variant)
    };
    (@name $variant:ident $label:literal) => {
        $label
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(=> $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Look up a variant by its event name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| $crate::core::EventKind::name(kind) == name)
            }
        }

        impl $crate::core::EventKind for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::event_kind!(@name $variant $($label)?)),*
                }
            }
        }
    };
}
