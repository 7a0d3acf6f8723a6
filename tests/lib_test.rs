//! Library integration tests.

use rxboot::RxbootError;

#[test]
fn error_types_are_public() {
    let err = RxbootError::RuntimeTooOld {
        detected: "3.7.3".into(),
        required: "3.8".into(),
    };
    assert!(err.to_string().contains("3.7.3"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> rxboot::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use rxboot::cli::{Cli, Commands};

    let cli = Cli::parse_from(["rxboot", "plan", "--json"]);

    if let Some(Commands::Plan(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Plan command");
    }
}

#[test]
fn layout_exposes_service_urls() {
    let layout = rxboot::StackLayout::new("/srv/app");
    assert_eq!(layout.api_url(), "http://localhost:8000");
    assert_eq!(layout.ui_url(), "http://localhost:8501");
}

#[test]
fn interrupt_is_shared_between_clones() {
    let interrupt = rxboot::Interrupt::new();
    let handle = interrupt.clone();
    handle.trigger();
    assert!(interrupt.is_set());
}
