//! Property-based tests for endpoint parsing, name validation and the INI
//! round trip of definitions.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use proptest::prelude::*;

use procserv_cli::domain::ini::IniDocument;
use procserv_cli::domain::instance::{
    Endpoint, InstanceDefinition, instance_of_unit_file, unit_name, validate_instance_name,
};

proptest! {
    /// Every u16 is a TCP port, bare or prefixed.
    #[test]
    fn prop_digits_are_tcp(port in any::<u16>()) {
        prop_assert_eq!(Endpoint::parse(&port.to_string()), Ok(Endpoint::Tcp(port)));
        prop_assert_eq!(Endpoint::parse(&format!("tcp:{port}")), Ok(Endpoint::Tcp(port)));
    }

    /// Digit strings beyond the port range are rejected, not wrapped.
    #[test]
    fn prop_out_of_range_ports_rejected(port in 65_536u32..10_000_000) {
        prop_assert!(Endpoint::parse(&port.to_string()).is_err());
    }

    /// Anything that is not digits names a socket path.
    #[test]
    fn prop_paths_are_unix(path in "/[a-z]{1,10}(/[a-z0-9_.]{1,10}){0,3}") {
        prop_assert_eq!(Endpoint::parse(&path), Ok(Endpoint::Unix(PathBuf::from(&path))));
        prop_assert_eq!(
            Endpoint::parse(&format!("unix:{path}")),
            Ok(Endpoint::Unix(PathBuf::from(&path)))
        );
    }

    /// Display output parses back to the same endpoint.
    #[test]
    fn prop_display_reparses(port in any::<u16>(), path in "/[a-z]{1,12}") {
        for ep in [Endpoint::Tcp(port), Endpoint::Unix(PathBuf::from(path.clone()))] {
            prop_assert_eq!(Endpoint::parse(&ep.to_string()), Ok(ep.clone()));
        }
    }

    /// Valid names map to unit files and back.
    #[test]
    fn prop_valid_names_round_trip_through_unit_names(name in "[A-Za-z0-9_][A-Za-z0-9_.:-]{0,40}") {
        prop_assert!(validate_instance_name(&name).is_ok());
        let unit = unit_name(&name);
        prop_assert_eq!(instance_of_unit_file(&unit), Some(name.as_str()));
    }

    /// Names with separators or whitespace are rejected.
    #[test]
    fn prop_names_with_bad_characters_rejected(
        prefix in "[a-z]{0,5}",
        bad in prop::sample::select(vec!['/', ' ', '@', '%', '$', '\n', '[', ']']),
        suffix in "[a-z]{0,5}",
    ) {
        let name = format!("{prefix}{bad}{suffix}");
        prop_assert!(validate_instance_name(&name).is_err(), "accepted {:?}", name);
    }

    /// Names may not start with '.', ':' or '-'.
    #[test]
    fn prop_leading_punctuation_rejected(
        lead in prop::sample::select(vec!['.', ':', '-']),
        rest in "[a-z0-9]{0,10}",
    ) {
        let name = format!("{lead}{rest}");
        prop_assert!(validate_instance_name(&name).is_err());
    }

    /// A definition written by `add` loads back unchanged.
    #[test]
    fn prop_definition_survives_the_config_file(
        name in "[a-z][a-z0-9_]{0,15}",
        port in any::<u16>(),
        enabled in any::<bool>(),
        user in proptest::option::of("[a-z]{1,8}"),
        args in proptest::collection::vec("[a-zA-Z0-9 ._-]{1,12}", 0..4),
    ) {
        let mut tokens = vec![format!("/opt/{name}/st.cmd")];
        tokens.extend(args);
        let def = InstanceDefinition {
            name: name.clone(),
            enabled,
            user,
            group: None,
            chdir: PathBuf::from(format!("/opt/{name}")),
            command: shell_words::join(&tokens),
            endpoint: Endpoint::Tcp(port),
            host: None,
            site: None,
        };
        let doc = IniDocument {
            defaults: Vec::new(),
            sections: vec![def.to_section()],
        };
        let parsed = IniDocument::parse(&doc.render()).expect("rendered config parses");
        let section = parsed.section(&name).expect("section present");
        let back = InstanceDefinition::from_section(section).expect("valid definition");
        prop_assert_eq!(back, def);
    }
}
