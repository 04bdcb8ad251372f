use quiver_error::{QuiverError, Result};

use crate::arrays::vector::{BooleanVector, PrimitiveVector, Vector};

/// Keep values whose corresponding selection entry is true.
pub fn filter(vector: &Vector, selection: &BooleanVector) -> Result<Vector> {
    if vector.len() != selection.len() {
        return Err(QuiverError::illegal_state(format!(
            "Selection length {} does not match vector length {}",
            selection.len(),
            vector.len(),
        )));
    }

    Ok(match vector {
        Vector::Utf8(v) => Vector::Utf8(filter_primitive(v, selection)),
        Vector::Number(v) => Vector::Number(filter_primitive(v, selection)),
        Vector::Boolean(v) => Vector::Boolean(filter_primitive(v, selection)),
    })
}

fn filter_primitive<T: Clone>(
    values: &PrimitiveVector<T>,
    selection: &BooleanVector,
) -> PrimitiveVector<T> {
    values
        .iter()
        .zip(selection.iter())
        .filter_map(|(value, keep)| keep.then(|| value.clone()))
        .collect()
}
