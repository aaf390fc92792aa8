// https://www.johndcook.com/blog/standard_deviation/
#[derive(Clone, Debug, Default)]
pub struct Average {
    avg: f64,
    k: f64,
}

impl Average {
    pub fn new() -> Self {
        Self { avg: 0.0, k: 0.0 }
    }

    pub fn add(&mut self, value: impl Into<f64>) {
        let value = value.into();
        self.k += 1.0;
        self.avg += (value - self.avg) / self.k;
    }

    pub fn average(&self) -> f64 {
        self.avg
    }

    pub fn count(&self) -> usize {
        self.k as usize
    }
}

impl<A: Into<f64>> Extend<A> for Average {
    fn extend<T: IntoIterator<Item = A>>(&mut self, iter: T) {
        iter.into_iter().for_each(|a| self.add(a))
    }
}

impl<A: Into<f64>> FromIterator<A> for Average {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let mut avg = Average::new();
        avg.extend(iter);
        avg
    }
}

/// Sample Pearson correlation of two equally long series. A series without any
/// variance correlates perfectly with everything.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    let mean_a = a.iter().copied().collect::<Average>().average();
    let mean_b = b.iter().copied().collect::<Average>().average();

    let mut cross = 0.0;
    let mut sq_a = 0.0;
    let mut sq_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cross += dx * dy;
        sq_a += dx * dx;
        sq_b += dy * dy;
    }

    let denom = sq_a * sq_b;
    if denom.abs() > f64::EPSILON {
        cross / denom.sqrt()
    } else {
        1.0
    }
}

/// Rescales all values linearly so that the smallest becomes 0 and the largest 1. All
/// values become 0 if they are all the same.
pub fn normalize_min_max(values: &mut [f64]) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });

    let range = max - min;
    if range > f64::EPSILON {
        values.iter_mut().for_each(|v| *v = (*v - min) / range);
    } else {
        values.iter_mut().for_each(|v| *v = 0.0);
    }
}
