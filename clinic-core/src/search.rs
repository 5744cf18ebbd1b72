//! Case-insensitive substring search across named record fields.

use crate::record::Searchable;
use crate::ClinicError;

/// Check every name against `R::FIELDS`.
pub(crate) fn validate_fields<R: Searchable, S: AsRef<str>>(
    fields: &[S],
) -> Result<(), ClinicError> {
    for field in fields {
        let field = field.as_ref();
        if !R::FIELDS.iter().any(|known| *known == field) {
            return Err(ClinicError::UnknownField {
                field: field.to_string(),
                expected: R::FIELDS.join(", "),
            });
        }
    }
    Ok(())
}

/// Whether any of `fields` contains `needle`. `needle` must already be
/// trimmed and lowercased.
pub(crate) fn matches_needle<R: Searchable, S: AsRef<str>>(
    record: &R,
    needle: &str,
    fields: &[S],
) -> bool {
    let matches = |name: &str| {
        record
            .field(name)
            .map(|value| value.canonical().to_lowercase().contains(needle))
            .unwrap_or(false)
    };

    if fields.is_empty() {
        R::FIELDS.iter().copied().any(matches)
    } else {
        fields.iter().any(|name| matches(name.as_ref()))
    }
}

/// Records where any of `fields` contains `term`, ignoring case.
///
/// A blank term returns everything. An empty `fields` slice searches every
/// field the record exposes. Unknown field names are rejected even when the
/// term is blank.
pub fn filter_by_search<R: Searchable + Clone, S: AsRef<str>>(
    records: &[R],
    term: &str,
    fields: &[S],
) -> Result<Vec<R>, ClinicError> {
    validate_fields::<R, S>(fields)?;

    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(records.to_vec());
    }

    Ok(records
        .iter()
        .filter(|record| matches_needle(*record, &needle, fields))
        .cloned()
        .collect())
}
