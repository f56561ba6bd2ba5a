//! Property tests for distro name handling.

use distrolite::DistroState;
use distrolite_test_utils::SimRuntime;
use proptest::prelude::*;

proptest! {
    /// A NUL byte anywhere in the name fails every operation and never
    /// mutates the store.
    #[test]
    fn nul_byte_names_never_mutate_the_store(
        prefix in "[a-zA-Z0-9 ._-]{0,12}",
        suffix in "[a-zA-Z0-9 ._-]{0,12}",
    ) {
        let ctx = SimRuntime::new();
        ctx.register("Control");

        let bad = format!("{prefix}\0{suffix}");
        let distro = ctx.runtime.distro(&bad);

        prop_assert!(distro.register("rootfs.tar.gz").unwrap_err().is_invalid_name());
        prop_assert!(distro.unregister().unwrap_err().is_invalid_name());
        prop_assert!(distro.terminate().unwrap_err().is_invalid_name());
        prop_assert!(distro.set_as_default().unwrap_err().is_invalid_name());
        prop_assert!(distro.state().unwrap_err().is_invalid_name());
        prop_assert!(distro.guid().unwrap_err().is_invalid_name());
        prop_assert!(distro.configuration().unwrap_err().is_invalid_name());
        prop_assert!(distro.set_default_uid(1000).unwrap_err().is_invalid_name());

        let names: Vec<String> = ctx
            .runtime
            .registered_distros()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        prop_assert_eq!(names, vec!["Control".to_string()]);
        prop_assert!(ctx.runtime.default_distro().unwrap().is_none());
    }

    /// Any printable name without a NUL byte registers and resolves.
    #[test]
    fn printable_names_register_and_resolve(name in "[a-zA-Z][a-zA-Z0-9 ._-]{0,30}") {
        let ctx = SimRuntime::new();
        let distro = ctx.runtime.distro(&name);

        distro.register("rootfs.tar.gz").unwrap();
        prop_assert_eq!(distro.state().unwrap(), DistroState::Stopped);
        prop_assert!(!distro.guid().unwrap().is_nil());
    }
}
