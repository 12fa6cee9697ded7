/// Compile a regex once per process.
///
/// The pattern is a sequence of string literals and fragment macros (see
/// below) joined with `concat!`, so a grammar can be assembled from shared
/// pieces while still producing a single `&'static str` at compile time.
#[macro_export]
macro_rules! regex {
    ($($pat:tt)+) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new(concat!($($pat)+)).unwrap());
        &*RE
    }};
}

/// A shape form whose decorator carries the time the event *started*.
///
/// Preprocessed lines keep the decorator of their opening fragment, as do
/// the legacy formats.
#[macro_export]
macro_rules! start_form {
    ($($pat:tt)+) => {
        $crate::Form { regex: $crate::regex!($($pat)+), anchor: $crate::Anchor::Start }
    };
}

/// A shape form logged on completion: the decorator is the *end* time and the
/// start is recovered by subtracting the duration.
#[macro_export]
macro_rules! end_form {
    ($($pat:tt)+) => {
        $crate::Form { regex: $crate::regex!($($pat)+), anchor: $crate::Anchor::End }
    };
}

#[macro_export]
macro_rules! shape {
    (
        kind: $kind:expr
        $(, family: $family:expr)?
        $(, lines: $lines:expr)?
        $(, phrases: [ $($phrase:expr),* $(,)? ])?
        , forms: [ $($form:expr),+ $(,)? ]
        $(,)?
    ) => {{
        $crate::Shape {
            kind: $kind,
            family: { None $(.or(Some($family)))? },
            lines: { $crate::engine::LineMask::empty() $(| $lines)? },
            phrases: &[ $($($phrase),*)? ],
            forms: vec![ $($form),+ ],
        }
    }};
}

// --- Grammar fragments --------------------------------------------------------
//
// Each fragment expands to a string literal so it can be used inside
// `regex!`. Fragments that capture take the group name as a literal; a single
// regex must not use the same name twice.

/// Absolute datestamp, e.g. `2021-03-13T03:37:40.051+0530`.
#[macro_export]
#[doc(hidden)]
macro_rules! datestamp {
    () => {
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[.,]\d{3}[+-]\d{4}"
    };
}

/// Unified (`-Xlog`) decorator: one or more time brackets, optional level and
/// tag brackets, and the optional `GC(n)` id. Captured whole as `decorator`.
#[macro_export]
#[doc(hidden)]
macro_rules! unified {
    () => {
        concat!(
            r"^(?P<decorator>(?:\[(?:",
            $crate::datestamp!(),
            r"|\d+[.,]\d{3}s|\d+ms|\d+ns)\])+(?:\[(?:trace|debug|info|warning|error) *\])?(?:\[[a-z0-9_,]+ *\])?(?: GC\(\d+\))?)"
        )
    };
}

/// Legacy (JDK8 and earlier) decorator: `datestamp: uptime: `, either part
/// optional but not both. Captured whole as `decorator`.
#[macro_export]
#[doc(hidden)]
macro_rules! legacy {
    () => {
        concat!(
            r"^(?P<decorator>(?:",
            $crate::datestamp!(),
            r": )?\d+[.,]\d{3}: |",
            $crate::datestamp!(),
            r": )"
        )
    };
}

/// Timestamp repeated inside a legacy record (`1.234: [DefNew: ...`).
#[macro_export]
#[doc(hidden)]
macro_rules! inner {
    () => {
        concat!(r"(?:(?:", $crate::datestamp!(), r": )?\d+[.,]\d{3}: )?")
    };
}

/// Memory size with unit, e.g. `8186M`, `3072.0K`, `0.0B`.
#[macro_export]
#[doc(hidden)]
macro_rules! size {
    ($name:literal) => {
        concat!("(?P<", $name, r">\d+(?:[.,]\d+)?[BKMG])")
    };
}

/// `before->after(capacity)` for one region.
#[macro_export]
#[doc(hidden)]
macro_rules! transition {
    ($b:literal, $a:literal, $c:literal) => {
        concat!($crate::size!($b), r"->", $crate::size!($a), r"\(", $crate::size!($c), r"\)")
    };
}

/// JDK17 style `before(cap)->after(cap)`; the earlier form omits the first
/// capacity.
#[macro_export]
#[doc(hidden)]
macro_rules! transition17 {
    ($b:literal, $a:literal, $c:literal) => {
        concat!(
            $crate::size!($b),
            r"(?:\(\d+(?:[.,]\d+)?[BKMG]\))?->",
            $crate::size!($a),
            r"\(",
            $crate::size!($c),
            r"\)"
        )
    };
}

/// Trigger in parentheses; tolerates `System.gc()`.
#[macro_export]
#[doc(hidden)]
macro_rules! trigger {
    () => {
        r"\((?P<trigger>[^()]+(?:\(\))?)\)"
    };
}

/// Unified duration, `2127.343ms` (JDK8 Shenandoah logs `0.819 ms`).
#[macro_export]
#[doc(hidden)]
macro_rules! millis {
    () => {
        r"(?P<durms>\d+[.,]\d{3}) ?ms"
    };
}

/// Legacy duration, `0.0012345 secs`.
#[macro_export]
#[doc(hidden)]
macro_rules! secs {
    () => {
        r"(?P<dursecs>\d+[.,]\d+) secs"
    };
}

/// Unified CPU times block.
#[macro_export]
#[doc(hidden)]
macro_rules! unified_times {
    () => {
        r"(?: User=(?P<user>\d+[.,]\d{2})s Sys=(?P<sys>\d+[.,]\d{2})s Real=(?P<real>\d+[.,]\d{2})s)"
    };
}

/// Legacy `[Times: ...]` block.
#[macro_export]
#[doc(hidden)]
macro_rules! legacy_times {
    () => {
        r"(?: ?\[Times: user=(?P<user>\d+[.,]\d{2}) sys=(?P<sys>\d+[.,]\d{2}), real=(?P<real>\d+[.,]\d{2}) secs\])"
    };
}

/// Trailing whitespace is tolerated on every shape.
#[macro_export]
#[doc(hidden)]
macro_rules! eol {
    () => {
        r"[ ]*$"
    };
}

/// Size without a capture, for values the events do not keep.
#[macro_export]
#[doc(hidden)]
macro_rules! bare_size {
    () => {
        r"\d+(?:[.,]\d+)?[BKMG]"
    };
}

/// CPU times on lines whose event type does not keep them.
#[macro_export]
#[doc(hidden)]
macro_rules! bare_times {
    () => {
        r"(?: ?\[Times: user=\d+[.,]\d{2} sys=\d+[.,]\d{2}, real=\d+[.,]\d{2} secs\]| User=\d+[.,]\d{2}s Sys=\d+[.,]\d{2}s Real=\d+[.,]\d{2}s)"
    };
}
