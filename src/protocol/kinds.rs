//! Discriminant registry shared by the action and response vocabularies.
//!
//! Both vocabularies are declared through [`wire_kinds!`], which generates from
//! a single table:
//!
//! - a fieldless kind enum with one exhaustive `as_str()` match,
//! - a closed sum type wrapping every payload struct,
//! - the payload trait impl binding each struct to its kind.
//!
//! A discriminant that appears twice in a table fails the build.

/// Byte-wise string equality usable in const context.
const fn same(a: &str, b: &str) -> bool {
    // ---
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Returns `true` when no two tags in the slice are equal.
pub(crate) const fn all_distinct(tags: &[&str]) -> bool {
    // ---
    let mut i = 0;
    while i < tags.len() {
        let mut j = i + 1;
        while j < tags.len() {
            if same(tags[i], tags[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

macro_rules! wire_kinds {
    (
        $(#[$kind_meta:meta])*
        $vis:vis enum $kind:ident;

        $(#[$any_meta:meta])*
        enum $any:ident: $body_trait:ident;

        {
            $( $(#[$var_meta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$kind_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $kind {
            $( $(#[$var_meta])* $variant, )+
        }

        const _: () = assert!(
            $crate::protocol::kinds::all_distinct(&[ $( $wire, )+ ]),
            "duplicate wire discriminant",
        );

        impl $kind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [$kind] = &[ $( $kind::$variant, )+ ];

            /// The wire discriminant string.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $kind::$variant => $wire, )+
                }
            }

            /// Look up the kind registered for a wire discriminant.
            pub fn from_wire(tag: &str) -> Option<Self> {
                match tag {
                    $( $wire => Some($kind::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $kind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        $(#[$any_meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $any {
            $( $variant($variant), )+
        }

        impl $any {
            /// The kind of the wrapped payload.
            pub fn kind(&self) -> $kind {
                match self {
                    $( $any::$variant(_) => $kind::$variant, )+
                }
            }

            pub(crate) fn body_value(&self) -> serde_json::Result<serde_json::Value> {
                match self {
                    $( $any::$variant(body) => serde_json::to_value(body), )+
                }
            }

            pub(crate) fn from_body(
                kind: $kind,
                body: serde_json::Value,
            ) -> serde_json::Result<Self> {
                match kind {
                    $( $kind::$variant => serde_json::from_value(body).map($any::$variant), )+
                }
            }
        }

        $(
            impl $body_trait for $variant {
                const KIND: $kind = $kind::$variant;
            }

            impl From<$variant> for $any {
                fn from(body: $variant) -> Self {
                    $any::$variant(body)
                }
            }

            impl TryFrom<$any> for $variant {
                type Error = $any;

                fn try_from(any: $any) -> std::result::Result<Self, $any> {
                    match any {
                        $any::$variant(body) => Ok(body),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

pub(crate) use wire_kinds;
