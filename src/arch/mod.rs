// src/arch/mod.rs

//! Target architectures: operating system × CPU
//!
//! Written as `OS-CPU`, e.g. `Linux-x86_64`, with `*` as a wildcard on
//! either side (`*-*` runs anywhere).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Operating system half of an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, EnumString)]
pub enum Os {
    #[default]
    #[strum(serialize = "*")]
    All,
    #[strum(serialize = "POSIX")]
    Posix,
    #[strum(serialize = "Linux")]
    Linux,
    #[strum(serialize = "Solaris")]
    Solaris,
    #[strum(serialize = "FreeBSD")]
    FreeBsd,
    #[strum(serialize = "Darwin")]
    Darwin,
    #[strum(serialize = "MacOSX")]
    MacOsx,
    #[strum(serialize = "Cygwin")]
    Cygwin,
    #[strum(serialize = "Windows")]
    Windows,
}

impl Os {
    /// Whether an implementation built for `self` runs on `target`
    pub fn runs_on(self, target: Os) -> bool {
        if self == Os::All || target == Os::All || self == target {
            return true;
        }
        match self {
            Os::Posix => matches!(
                target,
                Os::Linux | Os::Solaris | Os::FreeBsd | Os::Darwin | Os::MacOsx | Os::Cygwin
            ),
            Os::Darwin => target == Os::MacOsx,
            _ => false,
        }
    }

    fn host() -> Os {
        match env::consts::OS {
            "linux" => Os::Linux,
            "macos" => Os::MacOsx,
            "freebsd" => Os::FreeBsd,
            "solaris" | "illumos" => Os::Solaris,
            "windows" => Os::Windows,
            _ => Os::All,
        }
    }
}

/// CPU half of an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, EnumString)]
pub enum Cpu {
    #[default]
    #[strum(serialize = "*")]
    All,
    #[strum(serialize = "i386")]
    I386,
    #[strum(serialize = "i486")]
    I486,
    #[strum(serialize = "i586")]
    I586,
    #[strum(serialize = "i686")]
    I686,
    #[strum(serialize = "x86_64")]
    X86_64,
    #[strum(serialize = "ppc")]
    Ppc,
    #[strum(serialize = "ppc64")]
    Ppc64,
    #[strum(serialize = "armv6l")]
    Armv6l,
    #[strum(serialize = "armv7l")]
    Armv7l,
    #[strum(serialize = "aarch64")]
    Aarch64,
    /// Source code, needs compiling before it runs anywhere
    #[strum(serialize = "src")]
    Src,
}

impl Cpu {
    fn x86_level(self) -> Option<u8> {
        match self {
            Cpu::I386 => Some(3),
            Cpu::I486 => Some(4),
            Cpu::I586 => Some(5),
            Cpu::I686 => Some(6),
            Cpu::X86_64 => Some(7),
            _ => None,
        }
    }

    /// Whether an implementation built for `self` runs on `target`
    pub fn runs_on(self, target: Cpu) -> bool {
        if self == target || self == Cpu::All {
            return true;
        }
        if self == Cpu::Src || target == Cpu::Src {
            return false;
        }
        if target == Cpu::All {
            return true;
        }
        if let (Some(own), Some(host)) = (self.x86_level(), target.x86_level()) {
            return own <= host;
        }
        matches!(
            (self, target),
            (Cpu::Ppc, Cpu::Ppc64) | (Cpu::Armv6l, Cpu::Armv7l)
        )
    }

    fn host() -> Cpu {
        match env::consts::ARCH {
            "x86" => Cpu::I686,
            "x86_64" => Cpu::X86_64,
            "powerpc" => Cpu::Ppc,
            "powerpc64" => Cpu::Ppc64,
            "arm" => Cpu::Armv7l,
            "aarch64" => Cpu::Aarch64,
            _ => Cpu::All,
        }
    }
}

/// A combination of operating system and CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Architecture {
    pub os: Os,
    pub cpu: Cpu,
}

impl Architecture {
    pub fn new(os: Os, cpu: Cpu) -> Self {
        Self { os, cpu }
    }

    /// `*-*`, matches any target
    pub fn any() -> Self {
        Self::default()
    }

    /// The architecture of the running system
    pub fn host() -> Self {
        Self::new(Os::host(), Cpu::host())
    }

    /// Whether something built for this architecture runs on `target`
    pub fn runs_on(&self, target: &Architecture) -> bool {
        self.os.runs_on(target.os) && self.cpu.runs_on(target.cpu)
    }

    pub fn is_wildcard(&self) -> bool {
        self.os == Os::All && self.cpu == Cpu::All
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.cpu)
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (os, cpu) = s
            .split_once('-')
            .ok_or_else(|| Error::ParseError(format!("Architecture '{}' must be OS-CPU", s)))?;
        let os = Os::from_str(os)
            .map_err(|_| Error::ParseError(format!("Unknown operating system '{}'", os)))?;
        let cpu = Cpu::from_str(cpu)
            .map_err(|_| Error::ParseError(format!("Unknown CPU '{}'", cpu)))?;
        Ok(Self { os, cpu })
    }
}

impl TryFrom<String> for Architecture {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Architecture> for String {
    fn from(arch: Architecture) -> Self {
        arch.to_string()
    }
}
