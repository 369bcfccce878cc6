//! Privilege and platform information.

use std::path::Path;

use super::RealRuntime;
use crate::platform::{OsRelease, UnameInfo, platform_descriptor};

const OS_RELEASE_PATH: &str = "/etc/os-release";

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn is_privileged_impl(&self) -> bool {
        #[cfg(unix)]
        return nix::unistd::geteuid().as_raw() == 0;

        #[cfg(not(unix))]
        return false;
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn platform_impl(&self) -> String {
        let uname = Self::uname();
        let os_release = std::fs::read_to_string(Path::new(OS_RELEASE_PATH))
            .ok()
            .map(|text| OsRelease::parse(&text));
        platform_descriptor(&uname, os_release.as_ref())
    }

    #[cfg(unix)]
    fn uname() -> UnameInfo {
        match nix::sys::utsname::uname() {
            Ok(uts) => UnameInfo {
                sysname: uts.sysname().to_string_lossy().into_owned(),
                release: uts.release().to_string_lossy().into_owned(),
                machine: uts.machine().to_string_lossy().into_owned(),
            },
            Err(e) => {
                log::debug!("uname failed: {}", e);
                UnameInfo::from_build_target()
            }
        }
    }

    #[cfg(not(unix))]
    fn uname() -> UnameInfo {
        UnameInfo::from_build_target()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_env_and_platform() {
        let runtime = RealRuntime;

        // Should work without panic
        let _ = runtime.is_privileged();

        let platform = runtime.platform();
        assert!(!platform.is_empty());
        assert!(platform.contains(std::env::consts::ARCH) || !cfg!(target_os = "linux"));
    }
}
