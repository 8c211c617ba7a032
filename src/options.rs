//! Compiler configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Code generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    /// ARM assembly for the GNU toolchain.
    #[default]
    Arm,
    /// A Jasmin class for the JVM.
    Jvm,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Arm => "arm",
            Target::Jvm => "jvm",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target '{0}', expected 'arm' or 'jvm'")]
pub struct UnknownTarget(pub String);

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arm" => Ok(Target::Arm),
            "jvm" => Ok(Target::Jvm),
            _ => Err(UnknownTarget(s.to_string())),
        }
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub target: Target,
    /// Name of the generated class on the JVM target.
    pub class_name: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            target: Target::Arm,
            class_name: "Main".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn arm() -> Self {
        Self::default()
    }

    pub fn jvm(class_name: impl Into<String>) -> Self {
        CompilerOptions {
            target: Target::Jvm,
            class_name: class_name.into(),
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
}
