use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("blogsift")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract blog articles and their images from web pages")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(--"base-url" <URL> "Base URL for resolving relative image URLs").value_name("URL"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, html, text, markdown)")
                .value_name("FORMAT")
                .default_value("json")
                .value_parser(["json", "html", "text", "markdown"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("20"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(--"min-text-length" <NUM> "Visible text a class-matched region must exceed to be chosen")
                .default_value("200"),
        )
        .arg(
            clap::arg!(--remove <SELECTOR> "Extra selector to strip from the article (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(--"fallback-title" <TITLE> "Title used when the page has none").default_value("Untitled"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "blogsift", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "blogsift", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "blogsift", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "blogsift", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
