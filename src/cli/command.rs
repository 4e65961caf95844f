//! Interactive commands typed at the pager prompt.

use crate::catalog::ArtworkId;
use crate::output::OutputFormat;
use crate::pager::PageSize;
use crate::utils;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    First,
    Last,
    Page(u32),
    Size(PageSize),
    Toggle(ArtworkId),
    Select(ArtworkId),
    Deselect(ArtworkId),
    SelectAll,
    /// `None` for a non-positive count, which is ignored.
    Bulk(Option<u32>),
    Selected,
    Export {
        path: String,
        format: Option<OutputFormat>,
    },
    Refresh,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  n, next               next page
  p, prev               previous page
  first | last          jump to the first or last page
  page <N>              open page N
  size <12|25|50>       change rows per page
  toggle <ID>           flip selection of a row on this page
  select <ID>           select a row on this page
  deselect <ID>         remove an artwork from the selection
  all                   select or deselect every row on this page
  bulk <N>              select the first N artworks of the catalog
  selected              list the selection
  export <FILE> [text|json]
                        write the selection to a file
  r, refresh            reload the current page
  h, help               show this help
  q, quit               exit";

fn arg<'a>(rest: &[&'a str], name: &str) -> Result<&'a str, String> {
    rest.first()
        .copied()
        .ok_or_else(|| format!("missing {name}, see `help`"))
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((head, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" => Command::Prev,
        "first" => Command::First,
        "last" => Command::Last,
        "page" | "goto" => Command::Page(utils::parse_page_number(arg(rest, "page")?)?),
        "size" => Command::Size(utils::parse_page_size(arg(rest, "size")?)?),
        "t" | "toggle" => Command::Toggle(utils::parse_artwork_id(arg(rest, "id")?)?),
        "select" => Command::Select(utils::parse_artwork_id(arg(rest, "id")?)?),
        "deselect" => Command::Deselect(utils::parse_artwork_id(arg(rest, "id")?)?),
        "a" | "all" => Command::SelectAll,
        "bulk" => Command::Bulk(utils::parse_select_count(arg(rest, "count")?)?),
        "selected" | "ls" => Command::Selected,
        "export" => {
            let path = arg(rest, "file")?.to_string();
            let format = match rest.get(1) {
                Some(raw) => Some(
                    OutputFormat::parse(raw).ok_or_else(|| format!("unknown format '{raw}'"))?,
                ),
                None => None,
            };
            Command::Export { path, format }
        }
        "r" | "refresh" => Command::Refresh,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', see `help`")),
    };
    Ok(Some(command))
}
