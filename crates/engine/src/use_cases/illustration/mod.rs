//! Illustration lookup for story segments.

use std::sync::Arc;

use crate::infrastructure::cache::BoundedCache;
use crate::infrastructure::ports::{ImageGenError, ImageGenPort, ImageRequest};

#[derive(Debug, thiserror::Error)]
pub enum IllustrationError {
    #[error("Image generation failed: {0}")]
    ImageGen(#[from] ImageGenError),
    #[error("Image generation returned no images")]
    NoImages,
}

/// Resolves an illustration prompt to a hosted image URL.
///
/// URLs are memoized by exact prompt string, so identical prompts across
/// requests hit the image service once (until evicted).
pub struct ImageResolver {
    image_gen: Arc<dyn ImageGenPort>,
    cache: BoundedCache<String, String>,
}

impl ImageResolver {
    pub fn new(image_gen: Arc<dyn ImageGenPort>, cache_capacity: usize) -> Self {
        Self {
            image_gen,
            cache: BoundedCache::new(cache_capacity),
        }
    }

    pub async fn resolve(&self, prompt: &str) -> Result<String, IllustrationError> {
        let key = prompt.to_string();
        if let Some(url) = self.cache.get(&key).await {
            tracing::debug!(url = %url, "Illustration cache hit");
            return Ok(url);
        }

        let result = self.image_gen.generate(ImageRequest::new(prompt)).await?;
        let url = result
            .urls
            .into_iter()
            .next()
            .ok_or(IllustrationError::NoImages)?;

        if let Some(evicted) = self.cache.insert(key, url.clone()).await {
            tracing::debug!(
                evicted_prompt_chars = evicted.len(),
                "Illustration cache evicted entry"
            );
        }
        tracing::info!(url = %url, "Illustration generated");

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{ImageResult, MockImageGenPort};

    fn result(urls: &[&str]) -> ImageResult {
        ImageResult {
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn identical_prompt_calls_service_once() {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .times(1)
            .withf(|req| req.prompt == "A snowy rooftop")
            .returning(|_| Ok(result(&["https://img.test/roof.webp"])));

        let resolver = ImageResolver::new(Arc::new(image_gen), 100);

        let first = resolver.resolve("A snowy rooftop").await.unwrap();
        let second = resolver.resolve("A snowy rooftop").await.unwrap();

        assert_eq!(first, "https://img.test/roof.webp");
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn different_prompts_miss_cache() {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .times(2)
            .returning(|req| {
                let url = format!("https://img.test/{}.webp", req.prompt.len());
                Ok(result(&[url.as_str()]))
            });

        let resolver = ImageResolver::new(Arc::new(image_gen), 100);

        let a = resolver.resolve("short").await.unwrap();
        let b = resolver.resolve("a longer prompt").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn takes_first_of_several_results() {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .returning(|_| Ok(result(&["https://img.test/0.webp", "https://img.test/1.webp"])));

        let resolver = ImageResolver::new(Arc::new(image_gen), 100);
        assert_eq!(
            resolver.resolve("prompt").await.unwrap(),
            "https://img.test/0.webp"
        );
    }

    #[tokio::test]
    async fn empty_result_is_error_and_not_cached() {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .times(2)
            .returning(|_| Ok(ImageResult::default()));

        let resolver = ImageResolver::new(Arc::new(image_gen), 100);

        assert!(matches!(
            resolver.resolve("prompt").await,
            Err(IllustrationError::NoImages)
        ));
        assert!(resolver.resolve("prompt").await.is_err());
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .times(1)
            .returning(|_| Err(ImageGenError::GenerationFailed("quota exceeded".to_string())));

        let resolver = ImageResolver::new(Arc::new(image_gen), 100);
        let err = resolver.resolve("prompt").await.unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn evicted_prompt_is_regenerated() {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .times(3)
            .returning(|req| Ok(result(&[format!("https://img.test/{}", req.prompt).as_str()])));

        let resolver = ImageResolver::new(Arc::new(image_gen), 1);

        resolver.resolve("first").await.unwrap();
        resolver.resolve("second").await.unwrap();
        // "first" was evicted by "second"
        resolver.resolve("first").await.unwrap();
    }
}
