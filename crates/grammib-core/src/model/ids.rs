//! Index types for model storage.
//!
//! Using `NonZeroU32` enables `Option<T>` niche optimization (no extra
//! space).

use core::num::NonZeroU32;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create from a raw index (1-based).
            #[must_use]
            pub const fn from_raw(raw: u32) -> Option<Self> {
                match NonZeroU32::new(raw) {
                    Some(n) => Some(Self(n)),
                    None => None,
                }
            }

            /// Create from a 0-based index.
            #[must_use]
            pub fn from_index(index: usize) -> Option<Self> {
                let raw = (index + 1) as u32;
                Self::from_raw(raw)
            }

            /// Get the raw value (1-based).
            #[must_use]
            pub const fn to_raw(self) -> u32 {
                self.0.get()
            }

            /// Get the 0-based index.
            #[must_use]
            pub const fn to_index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }
    };
}

define_id!(
    /// Loaded MIB module identifier.
    MibId
);

define_id!(
    /// OID tree node identifier.
    OidId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_zero() {
        assert!(OidId::from_raw(0).is_none());
    }

    #[test]
    fn test_round_trip() {
        let id = MibId::from_index(4).unwrap();
        assert_eq!(id.to_raw(), 5);
        assert_eq!(id.to_index(), 4);
    }

    #[test]
    fn test_option_size() {
        assert_eq!(
            core::mem::size_of::<Option<OidId>>(),
            core::mem::size_of::<OidId>()
        );
    }
}
