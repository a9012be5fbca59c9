// wfrun — Script parser (`[section]` headers, `#` comments, command lines)

use crate::workflow::Workflow;
use std::collections::BTreeMap;

/// Name of the implicit workflow collecting lines before the first header.
pub const DEFAULT_WORKFLOW: &str = "main";

/// A `[name] # description` header line.
#[derive(Debug, PartialEq, Eq)]
struct Header<'a> {
    name: &'a str,
    description: Option<&'a str>,
}

/// Parse a section header. Returns `None` when the line has no closing `]`
/// or the name between the brackets is blank.
///
/// Padding inside the brackets is not part of the name: `[ build ]` opens
/// `build`, the subcommand users actually type.
fn parse_header(line: &str) -> Option<Header<'_>> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let name = rest[..close].trim();
    if name.is_empty() {
        return None;
    }

    let description = rest[close + 1..]
        .trim()
        .strip_prefix('#')
        .map(str::trim)
        .filter(|d| !d.is_empty());

    Some(Header { name, description })
}

/// Parse script text into workflows keyed by name.
///
/// Headers open (or reopen) a section and never appear in any line list.
/// Blank lines and full-line `#` comments are dropped. Headers without a
/// closing bracket are ignored entirely: the current section stays open.
pub fn parse(text: &str) -> BTreeMap<String, Workflow> {
    let mut workflows: BTreeMap<String, Workflow> = BTreeMap::new();
    let mut current = DEFAULT_WORKFLOW.to_string();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let Some(header) = parse_header(line) else {
                tracing::debug!(line = %line, "Ignoring malformed section header");
                continue;
            };

            let workflow = workflows
                .entry(header.name.to_string())
                .or_insert_with(|| Workflow::new(header.name, None));
            if workflow.description.is_none() {
                workflow.description = header.description.map(str::to_string);
            }
            current = header.name.to_string();
            continue;
        }

        workflows
            .entry(current.clone())
            .or_insert_with(|| Workflow::new(current.as_str(), None))
            .lines
            .push(line.to_string());
    }

    workflows
}
