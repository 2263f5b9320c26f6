#[cfg(unix)]
mod unix {
    use assert_cmd::cargo::cargo_bin_cmd;
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn write_script(dir: &Path, name: &str, script: &str) -> PathBuf {
        let script_path = dir.join(name);
        fs::write(&script_path, script).unwrap();
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();
        script_path
    }

    /// Writes stub tools plus a config file pointing at them.
    fn write_tools_config(dir: &Path, pdflatex_body: &str) -> PathBuf {
        let pdflatex = write_script(dir, "fake-pdflatex.sh", pdflatex_body);
        let convert = write_script(
            dir,
            "fake-convert.sh",
            "#!/bin/sh\nfor arg in \"$@\"; do OUT=\"$arg\"; done\nprintf '\\211PNG\\r\\n\\032\\n' > \"$OUT\"\n",
        );
        let config_path = dir.join("dml.toml");
        fs::write(
            &config_path,
            format!(
                "[tools]\npdflatex = \"{}\"\nconvert = \"{}\"\n",
                pdflatex.display(),
                convert.display()
            ),
        )
        .unwrap();
        config_path
    }

    const WORKING_PDFLATEX: &str = r#"#!/bin/sh
OUTDIR=""
TEX=""
while [ $# -gt 0 ]; do
  case $1 in
    -output-directory) OUTDIR="$2"; shift ;;
    -*) ;;
    *) TEX="$1" ;;
  esac
  shift
done
STEM=$(basename "$TEX" .tex)
printf '%%PDF-1.5\n' > "$OUTDIR/$STEM.pdf"
"#;

    const FAILING_PDFLATEX: &str = "#!/bin/sh\necho '! Emergency stop.'\nexit 1\n";

    #[test]
    fn renders_math_as_kitty_images() {
        let dir = tempdir().unwrap();
        let config_path = write_tools_config(dir.path(), WORKING_PDFLATEX);

        let mut cmd = cargo_bin_cmd!("dml");
        cmd.arg("--config")
            .arg(config_path.as_os_str())
            .arg("--size")
            .arg("2")
            .write_stdin("The **area** is $\\pi r^2$.\n");

        let output = cmd.assert().success().get_output().stdout.clone();
        let stdout = String::from_utf8(output).unwrap();
        assert!(stdout.starts_with("The \x1b[1marea\x1b[22m is \x1b_Ga=T,f=100,r=2,m=0;"));
        assert!(stdout.ends_with("\x1b\\.\n"));
    }

    #[test]
    fn failed_formulas_are_printed_as_source() {
        let dir = tempdir().unwrap();
        let config_path = write_tools_config(dir.path(), FAILING_PDFLATEX);

        let mut cmd = cargo_bin_cmd!("dml");
        cmd.env_remove("RUST_LOG")
            .arg("--config")
            .arg(config_path.as_os_str())
            .write_stdin("Broken \\(\\frac{1}\\) formula\n");

        cmd.assert()
            .success()
            .stdout("Broken \\(\\frac{1}\\) formula\n")
            .stderr(predicate::str::contains("Failed to render"));
    }

    #[test]
    fn whole_document_failure_exits_non_zero() {
        let dir = tempdir().unwrap();
        let config_path = write_tools_config(dir.path(), FAILING_PDFLATEX);

        let mut cmd = cargo_bin_cmd!("dml");
        cmd.arg("--config")
            .arg(config_path.as_os_str())
            .arg("--render-all-latex")
            .write_stdin("# Title\n\n$x$\n");

        cmd.assert()
            .failure()
            .stdout("# Title\n\n$x$\n")
            .stderr(predicate::str::contains("Error in full LaTeX rendering mode"));
    }

    #[test]
    fn debug_flag_enables_debug_logging() {
        let dir = tempdir().unwrap();
        let config_path = write_tools_config(dir.path(), WORKING_PDFLATEX);

        let mut cmd = cargo_bin_cmd!("dml");
        cmd.env_remove("RUST_LOG")
            .arg("--config")
            .arg(config_path.as_os_str())
            .arg("--debug")
            .write_stdin("$x$\n");

        cmd.assert()
            .success()
            .stderr(predicate::str::contains("Rendering math"));
    }

    #[test]
    fn plain_text_needs_no_tools() {
        let mut cmd = cargo_bin_cmd!("dml");
        cmd.write_stdin("just *text*\n");

        cmd.assert()
            .success()
            .stdout("just \x1b[3mtext\x1b[23m\n");
    }
}
