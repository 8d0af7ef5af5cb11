use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let extract = clap::Command::new("extract")
        .about("Extract metadata from episode pages into a JSON list of records")
        .arg(clap::arg!(<PATH> ... "Episode pages, or directories to search for <digits>.html pages"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file, or '-' for stdout")
                .value_name("FILE")
                .default_value("./addventure_meta.json"),
        )
        .arg(clap::arg!(--"no-doublecheck" "Don't require the in-page episode ID to match the filename"))
        .arg(clap::arg!(--compact "Write JSON without indentation"));

    let is_primary = clap::arg!(--"is-primary" "Require each key to match exactly one record");
    let reshape = clap::Command::new("reshape")
        .about("Regroup a JSON list of records into indexes")
        .arg(
            clap::arg!(-i --infile <FILE> "JSON dump to read, or '-' for stdin")
                .value_name("FILE")
                .default_value("./addventure_meta.json"),
        )
        .arg(clap::arg!(-o --outfile <FILE> "Output file, or '-' for stdout").default_value("-"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, yaml)")
                .value_name("FORMAT")
                .default_value("json")
                .value_parser(["json", "yaml"]),
        )
        .arg(clap::arg!(-s --sort <FIELD> "Field to sort records by").default_value("id"))
        .subcommand(
            clap::Command::new("key-by")
                .about("Produce a (possibly nested) object mapping keys to records")
                .arg(clap::arg!(<KEY> ... "Fields to group by, outermost first"))
                .arg(is_primary.clone()),
        )
        .subcommand(
            clap::Command::new("index-by")
                .about("Produce a (possibly nested) object mapping keys to record IDs")
                .arg(clap::arg!(<KEY> ... "Fields to group by, outermost first"))
                .arg(clap::arg!(--target <FIELD> "Field returned for each matching record").default_value("id"))
                .arg(is_primary),
        )
        .subcommand(
            clap::Command::new("flatten")
                .about("Convert records into a form usable with flat formats like CSV/TSV")
                .arg(clap::arg!(--"tag-separator" <SEP> "Separator used when joining list fields").default_value("|")),
        );

    let mut cmd = clap::Command::new("addventure")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract and reshape Anime Addventure episode metadata")
        .arg(clap::arg!(-v --verbose ... "Increase log verbosity").global(true))
        .arg(clap::arg!(-q --quiet ... "Decrease log verbosity").global(true))
        .subcommand(extract)
        .subcommand(reshape)
        .subcommand(
            clap::Command::new("completions")
                .about("Print a shell completion script to stdout")
                .arg(clap::arg!(<SHELL> "Target shell").value_parser(["bash", "elvish", "fish", "powershell", "zsh"])),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "addventure", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "addventure", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "addventure", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "addventure", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
