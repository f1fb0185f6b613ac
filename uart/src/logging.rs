macro_rules! log_at {
    ($level:ident, $($arg:expr),*) => {{
        $(let _ = &$arg;)*

        #[cfg(feature = "logging")]
        ::log::$level!($($arg),*);

        #[cfg(feature = "defmt-logging")]
        ::defmt::$level!($($arg),*);
    }};
}

macro_rules! log_warn {
    ($($arg:expr),*) => {
        $crate::logging::log_at!(warn, $($arg),*)
    };
}

macro_rules! log_info {
    ($($arg:expr),*) => {
        $crate::logging::log_at!(info, $($arg),*)
    };
}

macro_rules! log_debug {
    ($($arg:expr),*) => {
        $crate::logging::log_at!(debug, $($arg),*)
    };
}

macro_rules! log_trace {
    ($($arg:expr),*) => {
        $crate::logging::log_at!(trace, $($arg),*)
    };
}

pub(crate) use {log_at, log_debug, log_info, log_trace, log_warn};
