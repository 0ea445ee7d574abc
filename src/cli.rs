// isosplice/src/cli.rs
//! Command-line and batch-file argument handling.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::iso::{PatchOptions, Replacement, WriteMode};
use crate::utils::{read_file_from_path, strip_quotes};

pub const USAGE: &str = "\
Usage: isosplice [OPTIONS] imagename {batchFileOfArguments | (filename newfile ...)}
- 'imagename' is the name of the ISO image
- 'batchFileOfArguments' is a file holding one argument per line, for replacing
  more files than the command line can hold
- 'filename' is the file in the image with the data to be replaced
- 'newfile' is the host file with the new data
* 'imagename' must be a valid ISO9660 image
* 'filename' can use either the slash or backslash
* 'newfile' can be a different size than 'filename'

Options:
  --atomic       write through a temporary file and rename it over the image
  -v, --verbose  log every shifted record
  -q, --quiet    only log warnings and errors
  -h, --help     print this help";

static SKIPPED_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(#.*)?$").unwrap());

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// A fully parsed patch request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub image: PathBuf,
    pub replacements: Vec<Replacement>,
    pub options: PatchOptions,
    pub verbosity: Verbosity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Patch(Invocation),
    Help,
}

/// Reads the argument lines of a batch file. Blank lines and lines
/// starting with `#` are skipped.
pub fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    let content = read_file_from_path(path)?;
    Ok(String::from_utf8_lossy(&content)
        .lines()
        .filter(|line| !SKIPPED_LINE.is_match(line))
        .map(|line| strip_quotes(line.trim()))
        .collect())
}

/// Parses the process arguments (without the program name).
///
/// Options are only recognised before the image path.
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut options = PatchOptions::default();
    let mut verbosity = Verbosity::default();
    let mut positionals = Vec::new();
    let mut options_done = false;

    for arg in args {
        if !options_done {
            match arg.as_str() {
                "--" => {
                    options_done = true;
                    continue;
                }
                "-h" | "--help" => return Ok(Command::Help),
                "--atomic" => {
                    options.write_mode = WriteMode::Atomic;
                    continue;
                }
                "-v" | "--verbose" => {
                    verbosity = Verbosity::Verbose;
                    continue;
                }
                "-q" | "--quiet" => {
                    verbosity = Verbosity::Quiet;
                    continue;
                }
                flag if flag.len() > 1 && flag.starts_with('-') => {
                    return Err(Error::BadArguments(format!("unknown option '{}'", flag)));
                }
                // Everything from the image path on is positional.
                _ => options_done = true,
            }
        }
        positionals.push(strip_quotes(&arg));
    }

    if positionals.len() == 2 {
        if let Some(batch) = positionals.pop() {
            positionals.extend(read_batch_file(Path::new(&batch))?);
        }
    }

    if positionals.len() < 3 || positionals.len() % 2 != 1 {
        return Err(Error::BadArguments(format!(
            "expected an image followed by pairs of 'filename newfile', got {} argument(s)",
            positionals.len()
        )));
    }

    let mut positionals = positionals.into_iter();
    let image = positionals.next().map(PathBuf::from).unwrap_or_default();
    let rest: Vec<String> = positionals.collect();
    let replacements = rest
        .chunks_exact(2)
        .map(|pair| Replacement {
            image_path: pair[0].clone(),
            source: PathBuf::from(&pair[1]),
        })
        .collect();

    Ok(Command::Patch(Invocation {
        image,
        replacements,
        options,
        verbosity,
    }))
}
