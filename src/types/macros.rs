//! Macros shared by the record and collection value types

/// Merge a record field by field: each field uses its own type's merge
/// rule, absent fields fill in from the other side, and every change is
/// reported under `info[field]`.
macro_rules! merge_fields {
    ($self:ident, $other:ident, $info:ident, $tag:ident; $($field:ident),+ $(,)?) => {{
        let mut result = $self.clone();
        $(
            let update = match (&result.$field, &$other.$field) {
                (Some(mine), Some(theirs)) => {
                    let (merged, outcome) = mine.merge_item(theirs);
                    $crate::core::merge::log_outcome(
                        outcome,
                        &format!("{}[{}]", $info, stringify!($field)),
                        $tag,
                        mine,
                        theirs,
                        Self::QUIET,
                    );
                    Some(merged)
                }
                (None, Some(theirs)) => {
                    $crate::core::merge::log_outcome(
                        Some($crate::core::merge::MergeOutcome::Merged),
                        &format!("{}[{}]", $info, stringify!($field)),
                        $tag,
                        theirs,
                        theirs,
                        Self::QUIET,
                    );
                    Some(theirs.clone())
                }
                _ => None,
            };
            if update.is_some() {
                result.$field = update;
            }
        )+
        result
    }};
}
