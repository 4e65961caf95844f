use crate::catalog::ArtworkId;
use crate::pager::PageSize;

pub fn parse_page_number(value: &str) -> Result<u32, String> {
    let page: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid page '{}'", value.trim()))?;
    if page == 0 {
        return Err("pages start at 1".to_string());
    }
    Ok(page)
}

pub fn parse_page_size(value: &str) -> Result<PageSize, String> {
    let raw: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid page size '{}'", value.trim()))?;
    PageSize::try_from(raw).map_err(|e| e.to_string())
}

pub fn parse_artwork_id(value: &str) -> Result<ArtworkId, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid artwork id '{}'", value.trim()))
}

/// Parse a "select first N" count. Zero and negative counts parse to `None`
/// and are ignored by the caller.
pub fn parse_select_count(value: &str) -> Result<Option<u32>, String> {
    let raw: i64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid count '{}'", value.trim()))?;
    if raw <= 0 {
        return Ok(None);
    }
    u32::try_from(raw)
        .map(Some)
        .map_err(|_| format!("count {raw} is too large"))
}

/// Shorten `value` to at most `width` characters.
pub fn truncate(value: &str, width: usize) -> String {
    let single_line = value.replace(['\n', '\r', '\t'], " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    if width <= 3 {
        return single_line.chars().take(width).collect();
    }
    let mut out: String = single_line.chars().take(width - 3).collect();
    out.push_str("...");
    out
}
