//! JVM option string parsing, only as far as the analysis checks need it.

/// Options from a JVM command line (`-Xms2g -XX:+UseG1GC -XX:MaxGCPauseMillis=200 ...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JvmOptions {
    /// `-XX:+Name`
    pub enabled: Vec<String>,
    /// `-XX:-Name`
    pub disabled: Vec<String>,
    /// `-XX:Name=value`
    pub values: Vec<(String, String)>,
    pub xms: Option<String>,
    pub xmx: Option<String>,
    /// `-Xlog...`/`-Xloggc...` options, verbatim.
    pub logging: Vec<String>,
}

impl JvmOptions {
    /// Later occurrences of a flag win, as on the JVM.
    pub fn parse(options: &str) -> Self {
        let mut parsed = JvmOptions::default();
        for option in options.split_whitespace() {
            if let Some(name) = option.strip_prefix("-XX:+") {
                parsed.disabled.retain(|n| n != name);
                parsed.enabled.push(name.to_string());
            } else if let Some(name) = option.strip_prefix("-XX:-") {
                parsed.enabled.retain(|n| n != name);
                parsed.disabled.push(name.to_string());
            } else if let Some(pair) = option.strip_prefix("-XX:") {
                if let Some((name, value)) = pair.split_once('=') {
                    parsed.values.retain(|(n, _)| n != name);
                    parsed.values.push((name.to_string(), value.to_string()));
                }
            } else if let Some(size) = option.strip_prefix("-Xms") {
                parsed.xms = Some(size.to_string());
            } else if let Some(size) = option.strip_prefix("-Xmx") {
                parsed.xmx = Some(size.to_string());
            } else if option.starts_with("-Xlog") || option.starts_with("-verbose:gc") {
                parsed.logging.push(option.to_string());
            }
        }
        parsed
    }

    pub fn is_empty(&self) -> bool {
        *self == JvmOptions::default()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|n| n == name)
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|n| n == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Initial heap size, from `-Xms` or `-XX:InitialHeapSize`.
    pub fn initial_heap(&self) -> Option<u64> {
        self.xms.as_deref().and_then(bytes).or_else(|| self.value("InitialHeapSize").and_then(bytes))
    }

    /// Maximum heap size, from `-Xmx` or `-XX:MaxHeapSize`.
    pub fn max_heap(&self) -> Option<u64> {
        self.xmx.as_deref().and_then(bytes).or_else(|| self.value("MaxHeapSize").and_then(bytes))
    }
}

/// `2g`, `512M`, `1024k`, `2147483648` to bytes.
fn bytes(size: &str) -> Option<u64> {
    let size = size.trim();
    let (digits, factor) = match size.char_indices().last()? {
        (idx, 'k' | 'K') => (&size[..idx], 1u64 << 10),
        (idx, 'm' | 'M') => (&size[..idx], 1 << 20),
        (idx, 'g' | 'G') => (&size[..idx], 1 << 30),
        (idx, 't' | 'T') => (&size[..idx], 1 << 40),
        _ => (size, 1),
    };
    digits.parse::<u64>().ok()?.checked_mul(factor)
}
