use diffpose_image::{Image, ImageError};

/// Compute the sum of squared differences between two images.
pub fn sse<const C: usize>(image1: &Image<f32, C>, image2: &Image<f32, C>) -> Result<f32, ImageError> {
    super::check_same_size(image1, image2)?;

    Ok(image1
        .as_slice()
        .iter()
        .zip(image2.as_slice().iter())
        .fold(0f32, |acc, (&a, &b)| acc + (a - b).powi(2)))
}

#[cfg(test)]
mod tests {
    use diffpose_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_sse() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let image1 = Image::<f32, 1>::new(size, vec![0.0, 1.0])?;
        let image2 = Image::<f32, 1>::new(size, vec![2.0, 1.0])?;

        assert_eq!(super::sse(&image1, &image2)?, 4.0);

        let other = Image::<f32, 1>::new(
            ImageSize {
                width: 1,
                height: 2,
            },
            vec![0.0, 1.0],
        )?;
        assert!(super::sse(&image1, &other).is_err());

        Ok(())
    }
}
