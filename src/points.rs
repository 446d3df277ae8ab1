//! Parallel-array point buffers shared between the gesture recognizer and
//! the decoder-facing layer.

/// Record of the touch points of a whole gesture, aggregated across all
/// fingers. The four buffers grow in lockstep and hold the x-coordinate,
/// y-coordinate, pointer id and event time of every sample in temporal
/// merge order. Times are milliseconds since the first touch down of the
/// gesture.
#[derive(Debug, Clone, Default)]
pub struct InputPointers {
    x_coordinates: Vec<i32>,
    y_coordinates: Vec<i32>,
    pointer_ids: Vec<i32>,
    times: Vec<i32>,
}

impl InputPointers {
    pub fn with_capacity(capacity: usize) -> InputPointers {
        InputPointers {
            x_coordinates: Vec::with_capacity(capacity),
            y_coordinates: Vec::with_capacity(capacity),
            pointer_ids: Vec::with_capacity(capacity),
            times: Vec::with_capacity(capacity),
        }
    }

    pub fn add_pointer(&mut self, x: i32, y: i32, pointer_id: i32, time: i32) {
        self.x_coordinates.push(x);
        self.y_coordinates.push(y);
        self.pointer_ids.push(pointer_id);
        self.times.push(time);
    }

    /// Append a range of one stroke's samples to the end of this record.
    /// The pointer id column is filled with `pointer_id` for the whole range.
    pub fn append(
        &mut self,
        pointer_id: i32,
        times: &[i32],
        x_coordinates: &[i32],
        y_coordinates: &[i32],
        start: usize,
        length: usize,
    ) {
        if length == 0 {
            return;
        }
        let end = start + length;
        self.x_coordinates.extend_from_slice(&x_coordinates[start..end]);
        self.y_coordinates.extend_from_slice(&y_coordinates[start..end]);
        self.pointer_ids
            .extend(std::iter::repeat(pointer_id).take(length));
        self.times.extend_from_slice(&times[start..end]);
    }

    /// Discard `element_count` samples at the start. Used by the decoder
    /// layer when the head of the gesture has already been committed.
    pub fn shift(&mut self, element_count: usize) {
        self.x_coordinates.drain(..element_count);
        self.y_coordinates.drain(..element_count);
        self.pointer_ids.drain(..element_count);
        self.times.drain(..element_count);
    }

    pub fn reset(&mut self) {
        self.x_coordinates.clear();
        self.y_coordinates.clear();
        self.pointer_ids.clear();
        self.times.clear();
    }

    pub fn len(&self) -> usize {
        self.x_coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_coordinates.is_empty()
    }

    pub fn x_coordinates(&self) -> &[i32] {
        &self.x_coordinates
    }

    pub fn y_coordinates(&self) -> &[i32] {
        &self.y_coordinates
    }

    pub fn pointer_ids(&self) -> &[i32] {
        &self.pointer_ids
    }

    /// The time each point was registered, in milliseconds, relative to the
    /// first event of the gesture.
    pub fn times(&self) -> &[i32] {
        &self.times
    }
}
