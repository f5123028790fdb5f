use ndarray::{Array2, Array4, ArrayView1, ArrayView2, Axis, s};

/// MFCC features of one clip, shaped `[1, T, num_mfcc, 1]`.
///
/// Leading axis is the batch (one clip), trailing axis the channel expected by
/// image-style classifiers.
///
/// # Example
/// ```
/// use mfx_core::FeatureTensor;
/// use ndarray::Array2;
/// let tensor = FeatureTensor::from_frames(Array2::zeros((49, 13)));
/// assert_eq!(tensor.shape(), [1, 49, 13, 1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    data: Array4<f32>,
}

impl FeatureTensor {
    /// Wrap a `[T, num_mfcc]` coefficient matrix as `[1, T, num_mfcc, 1]`.
    #[must_use]
    pub fn from_frames(frames: Array2<f32>) -> Self {
        Self {
            data: frames.insert_axis(Axis(2)).insert_axis(Axis(0)),
        }
    }

    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        let dim = self.data.dim();
        [dim.0, dim.1, dim.2, dim.3]
    }

    /// Number of analysis frames `T`.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    #[must_use]
    pub fn num_coefficients(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Coefficients as a `[T, num_mfcc]` view.
    #[must_use]
    pub fn frames(&self) -> ArrayView2<'_, f32> {
        self.data.slice(s![0, .., .., 0])
    }

    /// Coefficients of frame `t`.
    ///
    /// # Panics
    /// Panics if `t >= self.num_frames()`.
    #[must_use]
    pub fn frame(&self, t: usize) -> ArrayView1<'_, f32> {
        self.data.slice(s![0, t, .., 0])
    }

    #[must_use]
    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    #[must_use]
    pub fn into_array(self) -> Array4<f32> {
        self.data
    }

    /// Values in row-major order of the `[1, T, num_mfcc, 1]` shape.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_keeps_row_major_order() {
        let frames = Array2::from_shape_fn((3, 2), |(t, k)| (t * 10 + k) as f32);
        let tensor = FeatureTensor::from_frames(frames.clone());

        assert_eq!(tensor.shape(), [1, 3, 2, 1]);
        assert_eq!(tensor.num_frames(), 3);
        assert_eq!(tensor.num_coefficients(), 2);
        assert_eq!(tensor.to_vec(), vec![0.0, 1.0, 10.0, 11.0, 20.0, 21.0]);
        assert_eq!(tensor.frames(), frames.view());
        assert_eq!(tensor.frame(2).to_vec(), vec![20.0, 21.0]);
        assert_eq!(tensor.as_array()[[0, 1, 1, 0]], 11.0);
    }

    #[test]
    fn zero_frames_keeps_coefficient_axis() {
        let tensor = FeatureTensor::from_frames(Array2::zeros((0, 13)));
        assert_eq!(tensor.shape(), [1, 0, 13, 1]);
        assert!(tensor.to_vec().is_empty());
        assert_eq!(tensor.into_array().len(), 0);
    }
}
