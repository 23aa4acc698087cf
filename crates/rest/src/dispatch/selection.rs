//! Selections of resource ids taken from a URL segment.

use tabulon_persistence::error::ReferenceError;

/// Which ids of a resource a request addresses.
///
/// | Segment | Selection |
/// |---------|-----------|
/// | absent or empty | `None` |
/// | `*` | `All` |
/// | `B2,C3` | `Many` |
/// | `B2:C3` | `Range` |
/// | `B2` | `One` |
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Selection<I> {
    None,
    One(I),
    Many(Vec<I>),
    All,
    Range(I, I),
}

impl<I> Selection<I> {
    /// Parses a selection segment.
    ///
    /// `parse_id` reads a single id. Range syntax is rejected unless
    /// `ranges` is set.
    pub fn parse(
        text: Option<&str>,
        parse_id: impl Fn(&str) -> Result<I, ReferenceError>,
        ranges: bool,
    ) -> Result<Self, ReferenceError> {
        let text = match text {
            None | Some("") => return Ok(Selection::None),
            Some(text) => text,
        };
        let invalid = |message: &str| ReferenceError::InvalidSelection {
            text: text.to_string(),
            message: message.to_string(),
        };

        if text == "*" {
            return Ok(Selection::All);
        }
        if text.contains(',') {
            return text
                .split(',')
                .map(|item| match item.trim() {
                    "" => Err(invalid("empty item")),
                    item => parse_id(item),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Selection::Many);
        }
        if let Some((begin, end)) = text.split_once(':') {
            if !ranges {
                return Err(invalid("ranges are not supported"));
            }
            if begin.is_empty() || end.is_empty() {
                return Err(invalid("incomplete range"));
            }
            return Ok(Selection::Range(parse_id(begin)?, parse_id(end)?));
        }
        parse_id(text).map(Selection::One)
    }

    /// Returns `true` for [`Selection::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Returns the selected ids when they are listed explicitly.
    pub fn ids(&self) -> Option<Vec<&I>> {
        match self {
            Selection::One(id) => Some(vec![id]),
            Selection::Many(ids) => Some(ids.iter().collect()),
            Selection::None | Selection::All | Selection::Range(..) => None,
        }
    }
}
