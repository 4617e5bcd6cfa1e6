use crate::types::Workout;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no workout with id {id}")]
    NotFound { id: String },
}

/// Field a display sort can order by. Pace and speed only exist for one
/// kind each; workouts without the field sort after those that have it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Distance,
    Duration,
    Pace,
    Speed,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(SortField::Distance),
            "duration" => Ok(SortField::Duration),
            "pace" => Ok(SortField::Pace),
            "speed" => Ok(SortField::Speed),
            _ => Err(format!(
                "unknown sort field: {s} (expected distance, duration, pace or speed)"
            )),
        }
    }
}

/// Ordered collection of workouts. Insertion order is creation order and is
/// the order that gets persisted; display sorts work on copies.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    pub fn get(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Workout> {
        self.workouts.iter_mut().find(|w| w.id() == id)
    }

    /// Overwrite the workout at `id`'s position. The replacement carries its
    /// own (different) id; position, not identity, is what survives an edit.
    pub fn replace_by_id(&mut self, id: &str, replacement: Workout) -> Result<(), StoreError> {
        let pos = self.position(id)?;
        self.workouts[pos] = replacement;
        Ok(())
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<Workout, StoreError> {
        let pos = self.position(id)?;
        Ok(self.workouts.remove(pos))
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter()
    }

    /// Copy of the collection ordered ascending by `field`, for display
    /// only. Stable: equal keys keep their creation order.
    pub fn sorted_view(&self, field: SortField) -> Vec<Workout> {
        let mut view = self.workouts.clone();
        view.sort_by(|a, b| match (sort_key(a, field), sort_key(b, field)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        view
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.workouts
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}

fn sort_key(w: &Workout, field: SortField) -> Option<f64> {
    match field {
        SortField::Distance => Some(w.distance_km()),
        SortField::Duration => Some(w.duration_min()),
        SortField::Pace => w.pace_min_per_km(),
        SortField::Speed => w.speed_kmh(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coords;

    fn coords() -> Coords {
        Coords { lat: 39.0, lng: -12.0 }
    }

    fn store_of_three() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        store.push(Workout::running(coords(), 5.0, 30.0, 170.0));
        store.push(Workout::cycling(coords(), 27.0, 95.0, 523.0));
        store.push(Workout::running(coords(), 2.0, 10.0, 180.0));
        store
    }

    fn ids(workouts: &[Workout]) -> Vec<String> {
        workouts.iter().map(|w| w.id().to_string()).collect()
    }

    #[test]
    fn replace_keeps_position_and_neighbors() {
        let mut store = store_of_three();
        let before: Vec<String> = store.iter().map(|w| w.id().to_string()).collect();
        let target = before[1].clone();

        let replacement = Workout::cycling(coords(), 30.0, 100.0, 600.0);
        let new_id = replacement.id().to_string();
        store.replace_by_id(&target, replacement).unwrap();

        let after: Vec<String> = store.iter().map(|w| w.id().to_string()).collect();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(after[1], new_id);
        assert_ne!(after[1], target);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn replace_unknown_id_is_not_found() {
        let mut store = store_of_three();
        let replacement = Workout::running(coords(), 1.0, 5.0, 160.0);
        let err = store.replace_by_id("nonexistent", replacement).unwrap_err();
        assert_eq!(err, StoreError::NotFound { id: "nonexistent".to_string() });
    }

    #[test]
    fn remove_takes_exactly_one_entry() {
        let mut store = store_of_three();
        let before: Vec<String> = store.iter().map(|w| w.id().to_string()).collect();

        let removed = store.remove_by_id(&before[1]).unwrap();
        assert_eq!(removed.id(), before[1]);
        assert_eq!(store.len(), 2);

        let after: Vec<String> = store.iter().map(|w| w.id().to_string()).collect();
        assert_eq!(after, vec![before[0].clone(), before[2].clone()]);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut store = store_of_three();
        assert!(matches!(
            store.remove_by_id("nonexistent"),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn sorted_view_leaves_canonical_order_alone() {
        let store = store_of_three();
        let before: Vec<String> = store.iter().map(|w| w.id().to_string()).collect();

        let view = store.sorted_view(SortField::Distance);
        assert_eq!(view[0].distance_km(), 2.0);
        assert_eq!(view[1].distance_km(), 5.0);
        assert_eq!(view[2].distance_km(), 27.0);

        let after: Vec<String> = store.iter().map(|w| w.id().to_string()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn sorting_twice_matches_sorting_once() {
        let store = store_of_three();
        let once = ids(&store.sorted_view(SortField::Duration));

        let mut resorted = WorkoutStore::new();
        for w in store.sorted_view(SortField::Duration) {
            resorted.push(w);
        }
        let twice = ids(&resorted.sorted_view(SortField::Duration));
        assert_eq!(once, twice);
    }

    #[test]
    fn pace_sort_puts_cyclings_last_in_creation_order() {
        let mut store = store_of_three();
        store.push(Workout::cycling(coords(), 10.0, 30.0, 50.0));

        let view = store.sorted_view(SortField::Pace);
        assert!(view[0].pace_min_per_km().is_some());
        assert!(view[1].pace_min_per_km().is_some());
        // Both cyclings lack a pace and trail in their original order.
        assert_eq!(view[2].distance_km(), 27.0);
        assert_eq!(view[3].distance_km(), 10.0);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = store_of_three();
        assert!(!store.is_empty());
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }
}
