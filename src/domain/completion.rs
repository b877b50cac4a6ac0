//! Shell line handling: tokenizing and per-argument completion targets.
//!
//! The tables here only say *what kind* of value an argument position takes.
//! Fetching the candidates is left to the caller, which owns the API handle.

use std::collections::HashSet;

use crate::domain::error::DomainError;

/// Kind of value expected at an argument position.
///
/// Indices refer to earlier positional arguments of the same command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Command,
    Project,
    Environment { project_arg: usize },
    Source { project_arg: usize },
    Filter,
    ProjectFilter { project_arg: usize },
    FilterRule,
    EntityType,
    CriteriaField { type_arg: usize },
    CriteriaMatcher { type_arg: usize, field_arg: usize },
    /// Free text, nothing to complete.
    Any,
}

use ArgKind::*;

const ENV_OF_0: ArgKind = Environment { project_arg: 0 };
const SRC_OF_0: ArgKind = Source { project_arg: 0 };

/// Positional argument kinds per shell command.
pub const COMMANDS: &[(&str, &[ArgKind])] = &[
    ("clm_projectlist", &[]),
    ("clm_projectlistenv", &[Project]),
    ("clm_projectlistsrc", &[Project]),
    ("clm_projectlistfilter", &[Project]),
    ("clm_filterlistcriterias", &[]),
    ("clm_projectdetails", &[Project]),
    ("clm_projectbuild", &[Project]),
    ("clm_projectpromote", &[Project, ENV_OF_0]),
    ("clm_projectcreate", &[]),
    ("clm_projectattachesource", &[Project]),
    ("clm_projectdetachesource", &[Project, SRC_OF_0]),
    ("clm_projectaddenv", &[Project]),
    ("clm_projectdelenv", &[Project, ENV_OF_0]),
    ("clm_projectstagingfull", &[Project]),
    ("clm_filterlist", &[]),
    (
        "clm_filtercreate",
        &[
            Any,
            FilterRule,
            EntityType,
            CriteriaField { type_arg: 2 },
            CriteriaMatcher {
                type_arg: 2,
                field_arg: 3,
            },
        ],
    ),
    ("clm_projectattachefilter", &[Project, Filter]),
    (
        "clm_projectdetachefilter",
        &[Project, ProjectFilter { project_arg: 0 }],
    ),
    ("clm_filtercreateappstream", &[Project, SRC_OF_0]),
    ("clm_projectstatus", &[Project]),
    ("clm_envdiff", &[Project, ENV_OF_0, ENV_OF_0]),
];

/// Names of all lifecycle commands, in table order.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(name, _)| *name)
}

/// What the word under the cursor should complete to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub kind: ArgKind,
    /// Positional arguments typed before the current word.
    pub args: Vec<String>,
    /// Partial word being completed.
    pub prefix: String,
    /// Byte offset where the partial word starts.
    pub start: usize,
}

impl CompletionRequest {
    /// Earlier positional argument referenced by the request's kind.
    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }
}

/// Work out the completion target for `line` (text left of the cursor).
///
/// Words are split the way the shell splits them, so quoted arguments count
/// as one position. An open quote is allowed on the word under the cursor.
/// Option words (`-r`) are skipped when counting positions. Returns `None`
/// for unknown commands and positions beyond the table.
pub fn completion_request(line: &str) -> Option<CompletionRequest> {
    let Tokens {
        mut words, in_word, ..
    } = tokenize(line);

    let (prefix, start) = match words.pop() {
        Some(word) if in_word => (word.text, word.start),
        Some(word) => {
            words.push(word);
            (String::new(), line.len())
        }
        None => (String::new(), line.len()),
    };

    let Some((command, rest)) = words.split_first() else {
        return Some(CompletionRequest {
            kind: Command,
            args: Vec::new(),
            prefix,
            start,
        });
    };

    let kinds = arg_kinds(&command.text)?;
    let args: Vec<String> = rest
        .iter()
        .filter(|w| !w.text.starts_with('-'))
        .map(|w| w.text.clone())
        .collect();
    let kind = *kinds.get(args.len())?;

    Some(CompletionRequest {
        kind,
        args,
        prefix,
        start,
    })
}

/// Argument kinds for a command, if it is a lifecycle command.
pub fn arg_kinds(command: &str) -> Option<&'static [ArgKind]> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, kinds)| *kinds)
}

/// Keep candidates starting with `prefix`, first occurrence only, in input order.
pub fn filter_candidates<I, S>(candidates: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|c| c.starts_with(prefix) && seen.insert(c.clone()))
        .collect()
}

/// Split a shell line into words, honoring single/double quotes and
/// backslash escapes.
pub fn split_line(line: &str) -> Result<Vec<String>, DomainError> {
    let tokens = tokenize(line);
    if tokens.open_quote {
        return Err(DomainError::UnterminatedQuote(line.to_string()));
    }
    Ok(tokens.words.into_iter().map(|w| w.text).collect())
}

struct Word {
    text: String,
    /// Byte offset of the word's first character, quote included.
    start: usize,
}

struct Tokens {
    words: Vec<Word>,
    /// The line ends inside a word (no trailing unquoted blank).
    in_word: bool,
    open_quote: bool,
}

fn tokenize(line: &str) -> Tokens {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut word_start: Option<usize> = None;
    let mut quote: Option<char> = None;
    let mut chars = line.char_indices();

    while let Some((pos, c)) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some((_, next)) = chars.next() {
                    current.push(next);
                }
                word_start.get_or_insert(pos);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                word_start.get_or_insert(pos);
            }
            (None, c) if c.is_whitespace() => {
                if let Some(start) = word_start.take() {
                    words.push(Word {
                        text: std::mem::take(&mut current),
                        start,
                    });
                }
            }
            (None, c) => {
                current.push(c);
                word_start.get_or_insert(pos);
            }
        }
    }

    let in_word = word_start.is_some();
    if let Some(start) = word_start {
        words.push(Word {
            text: current,
            start,
        });
    }
    Tokens {
        words,
        in_word,
        open_quote: quote.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_empty_line_when_completing_then_command() {
        let req = completion_request("").unwrap();
        assert_eq!(req.kind, Command);
        assert_eq!(req.prefix, "");
    }

    #[test]
    fn given_partial_command_when_completing_then_command_prefix() {
        let req = completion_request("clm_proj").unwrap();
        assert_eq!(req.kind, Command);
        assert_eq!(req.prefix, "clm_proj");
        assert_eq!(req.start, 0);
    }

    #[rstest]
    #[case("clm_projectpromote ", Project, 0)]
    #[case("clm_projectpromote proj ", Environment { project_arg: 0 }, 1)]
    #[case("clm_envdiff proj dev ", Environment { project_arg: 0 }, 2)]
    #[case("clm_projectdetachesource proj ", Source { project_arg: 0 }, 1)]
    #[case("clm_projectattachefilter proj ", Filter, 1)]
    #[case("clm_projectdetachefilter proj ", ProjectFilter { project_arg: 0 }, 1)]
    #[case("clm_filtercreate myfilter ", FilterRule, 1)]
    #[case("clm_filtercreate myfilter deny ", EntityType, 2)]
    #[case("clm_filtercreate myfilter deny package ", CriteriaField { type_arg: 2 }, 3)]
    #[case("clm_projectstagingfull -r ", Project, 0)]
    fn given_command_line_when_completing_then_expected_kind(
        #[case] line: &str,
        #[case] kind: ArgKind,
        #[case] args: usize,
    ) {
        let req = completion_request(line).unwrap();
        assert_eq!(req.kind, kind);
        assert_eq!(req.args.len(), args);
    }

    #[test]
    fn given_partial_argument_when_completing_then_prefix_and_start() {
        let req = completion_request("clm_projectpromote proj de").unwrap();
        assert_eq!(req.kind, Environment { project_arg: 0 });
        assert_eq!(req.prefix, "de");
        assert_eq!(req.start, "clm_projectpromote proj ".len());
        assert_eq!(req.arg(0), Some("proj"));
    }

    #[test]
    fn given_position_past_table_when_completing_then_none() {
        assert!(completion_request("clm_projectbuild proj ").is_none());
        assert!(completion_request("clm_projectlist ").is_none());
        assert!(completion_request("unknown ").is_none());
    }

    #[test]
    fn given_candidates_when_filtering_then_unique_prefix_matches_in_order() {
        let out = filter_candidates(vec!["devel", "prod", "dev", "devel"], "de");
        assert_eq!(out, vec!["devel".to_string(), "dev".to_string()]);
    }

    #[rstest]
    #[case(r#"clm_filtercreate "my filter" "#, FilterRule, vec!["my filter"])]
    #[case(r#"clm_projectpromote "sles15" "#, Environment { project_arg: 0 }, vec!["sles15"])]
    #[case(r"clm_projectpromote my\ proj ", Environment { project_arg: 0 }, vec!["my proj"])]
    #[case(r#"clm_envdiff 'p 1' dev "#, Environment { project_arg: 0 }, vec!["p 1", "dev"])]
    fn given_quoted_arguments_when_completing_then_counted_as_one_word(
        #[case] line: &str,
        #[case] kind: ArgKind,
        #[case] args: Vec<&str>,
    ) {
        let req = completion_request(line).unwrap();
        assert_eq!(req.kind, kind);
        assert_eq!(req.args, args);
        assert_eq!(req.prefix, "");
        assert_eq!(req.start, line.len());
    }

    #[test]
    fn given_open_quote_under_cursor_when_completing_then_prefix_without_quote() {
        let line = r#"clm_projectpromote "sl"#;
        let req = completion_request(line).unwrap();
        assert_eq!(req.kind, Project);
        assert_eq!(req.prefix, "sl");
        assert_eq!(req.start, "clm_projectpromote ".len());
    }

    #[test]
    fn given_escaped_trailing_space_when_completing_then_still_in_word() {
        let req = completion_request(r"clm_projectbuild my\ ").unwrap();
        assert_eq!(req.kind, Project);
        assert_eq!(req.prefix, "my ");
    }

    #[test]
    fn given_quoted_words_when_splitting_then_keeps_spaces() {
        let words = split_line(r#"clm_projectcreate p1 "My Project" 'a b c'"#).unwrap();
        assert_eq!(words, vec!["clm_projectcreate", "p1", "My Project", "a b c"]);
    }

    #[test]
    fn given_escaped_space_when_splitting_then_single_word() {
        let words = split_line(r"a\ b c").unwrap();
        assert_eq!(words, vec!["a b", "c"]);
    }

    #[test]
    fn given_empty_quotes_when_splitting_then_empty_word() {
        let words = split_line(r#"cmd """#).unwrap();
        assert_eq!(words, vec!["cmd", ""]);
    }

    #[test]
    fn given_unterminated_quote_when_splitting_then_error() {
        assert!(matches!(
            split_line("cmd 'oops"),
            Err(DomainError::UnterminatedQuote(_))
        ));
    }

    #[test]
    fn every_command_has_unique_name() {
        let mut names: Vec<_> = command_names().collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
