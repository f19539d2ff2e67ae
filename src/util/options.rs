use crate::util::log::{trace, warn};
use std::default::Default;

/// The name of the debug variable that holds the foreign pointer checker setting, unless the
/// `check_var` option says otherwise.
pub const DEFAULT_CHECK_VAR: &str = "foreign_ptr_check";

/// The prefix of environment variables that set options, e.g. `GCPIN_RESTRAINER_THREADS=2`.
pub const ENV_PREFIX: &str = "GCPIN_";

fn always_valid<T>(_: &T) -> bool {
    true
}

macro_rules! options {
    ($($name:ident: $type:ty[$validator:expr] = $default:expr),*,) => [
        options!($($name: $type[$validator] = $default),*);
    ];
    ($($name:ident: $type:ty[$validator:expr] = $default:expr),*) => [
        /// Options of the pinning service.  Read once, when the service starts.
        #[derive(Clone, Debug)]
        pub struct Options {
            $(pub $name: $type),*
        }
        impl Options {
            /// Set an option by its name.  Return true if the value is parsed and valid.
            /// An invalid value is ignored, and the option keeps its current value.
            pub fn set_from_str(&mut self, s: &str, val: &str) -> bool {
                match s {
                    // Parse the given value from str (by env vars or by calling set_from_str()) to the right type
                    $(stringify!($name) => if let Ok(ref val) = val.parse::<$type>() {
                        // Validate
                        let validate_fn = $validator;
                        let is_valid = validate_fn(val);
                        if is_valid {
                            // Only set value if valid.
                            self.$name = val.clone();
                        } else {
                            warn!("Unable to set {}={:?}. Invalid value. Default value will be used.", s, val);
                        }
                        is_valid
                    } else {
                        warn!("Unable to set {}={:?}. Cant parse value. Default value will be used.", s, val);
                        false
                    })*
                    _ => panic!("Invalid Options key: {}", s)
                }
            }

            /// Options with their built-in defaults, ignoring environment variables.
            pub fn builtin() -> Self {
                Options {
                    $($name: $default),*
                }
            }
        }
        impl Default for Options {
            fn default() -> Self {
                let mut options = Self::builtin();

                // If we have env vars that start with GCPIN_ and match any option (such as GCPIN_RESTRAINER_THREADS),
                // we set the option to its value (if it is a valid value). Otherwise, use the default value.
                for (key, val) in std::env::vars() {
                    // strip the prefix, and get the lower case string
                    if let Some(rest_of_key) = key.strip_prefix(ENV_PREFIX) {
                        let lowercase: &str = &rest_of_key.to_lowercase();
                        match lowercase {
                            $(stringify!($name) => {
                                trace!("Setting option {} from env var {}", lowercase, key);
                                options.set_from_str(lowercase, &val);
                            },)*
                            _ => {}
                        }
                    }
                }
                options
            }
        }
    ]
}

options! {
    // Number of restrainer threads that run restraint work packets.  Parked restraints do not
    // occupy a thread, so this only bounds how many pins/releases are processed in parallel.
    restrainer_threads: usize  [|v: &usize| *v > 0] = num_cpus::get(),
    // Name of the debug variable that `no_check` switches off.
    check_var:          String [|v: &String| !v.is_empty()] = DEFAULT_CHECK_VAR.to_string(),
    // Initial value of the built-in foreign pointer checker variable.  0 disables the check.
    foreign_ptr_check:  i32    [|v: &i32| *v >= 0] = 1,
    // Log every pin and release at info level, not only at trace level.
    verbose:            bool   [always_valid] = false,
}
