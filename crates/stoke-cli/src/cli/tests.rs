#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dev_flags_become_overrides() {
        let cli = Cli::parse_from([
            "stoke", "dev", "--port", "4000", "--cdn-port", "4200", "--host", "127.0.0.1", "--https",
            "--cwd", "app",
        ]);
        let Command::Dev(args) = cli.command else {
            panic!("expected dev command");
        };

        let overrides = args.overrides();
        assert_eq!(overrides.app_port, Some(4000));
        assert_eq!(overrides.cdn_port, Some(4200));
        assert_eq!(overrides.host.as_deref(), Some("127.0.0.1"));
        assert!(overrides.https);
        assert_eq!(args.project.cwd, Some(PathBuf::from("app")));
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let Command::Dev(args) = Cli::parse_from(["stoke", "dev"]).command else {
            panic!("expected dev command");
        };
        assert_eq!(args.overrides(), Default::default());
    }

    #[test]
    fn test_port_zero_is_rejected() {
        assert!(Cli::try_parse_from(["stoke", "dev", "--port", "0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["stoke", "build", "--typescript", "false", "-v"]);
        assert!(cli.verbose);
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.overrides().typescript, Some(false));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["stoke", "-v", "-q", "dev"]).is_err());
    }
}
