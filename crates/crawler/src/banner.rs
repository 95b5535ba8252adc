pub fn print_banner(version: &str) {
    let banner = format!(
        r#"
 ███████╗██╗  ██╗██╗███╗   ██╗
 ██╔════╝██║ ██╔╝██║████╗  ██║
 ███████╗█████╔╝ ██║██╔██╗ ██║    skinwatch
 ╚════██║██╔═██╗ ██║██║╚██╗██║    v{}
 ███████║██║  ██╗██║██║ ╚████║
 ╚══════╝╚═╝  ╚═╝╚═╝╚═╝  ╚═══╝
"#,
        version
    );

    tracing::info!("{}", banner);
}
