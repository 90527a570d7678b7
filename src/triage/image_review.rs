use super::llm::ChatModel;
use base64::Engine as _;
use image::imageops::FilterType;
use image::DynamicImage;
use tokio::task;
use tracing::{debug, warn};

const MAX_SIDE: u32 = 800;
const MAX_BASE64_LEN: usize = 100_000;
const EXCERPT_LEN: usize = 1000;

/// Review an attached image for relevance to the complaint text. Always
/// produces a message for the records — every failure mode has its own
/// citizen-facing wording, and none of them fail the complaint.
pub async fn review_complaint_image(
    chat: Option<&dyn ChatModel>,
    image_path: &str,
    complaint: &str,
) -> String {
    if image_path.is_empty() {
        return "No image was provided with the complaint.".to_string();
    }
    if tokio::fs::metadata(image_path).await.is_err() {
        return "The image could not be found on the server.".to_string();
    }
    let Some(chat) = chat else {
        return "The image was received and will be evaluated by the relevant department."
            .to_string();
    };

    let path = image_path.to_string();
    let encoded = match task::spawn_blocking(move || encode_for_review(&path)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("image encode task failed: {}", e);
            return "The image was received but couldn't be properly processed.".to_string();
        }
    };
    let base64 = match encoded {
        Ok(b64) => b64,
        Err(failure) => return failure.message().to_string(),
    };

    // Only the first chunk of base64 rides along in the prompt.
    let excerpt: String = base64.chars().take(EXCERPT_LEN).collect();
    let prompt = format!(
        "A citizen has filed the following complaint: \"{}\". I've attached an image as evidence. Does this image appear to be relevant to the complaint? Give a brief assessment (2-3 sentences max). Base64 Image excerpt: {}...",
        complaint, excerpt
    );

    match chat.complete(&prompt).await {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!("image relevance assessment failed: {}", e);
            "Image received but couldn't be analyzed with AI. Your complaint has been registered."
                .to_string()
        }
    }
}

enum EncodeFailure {
    Open,
    Encode,
}

impl EncodeFailure {
    fn message(&self) -> &'static str {
        match self {
            EncodeFailure::Open => "The image was received but couldn't be properly processed.",
            EncodeFailure::Encode => {
                "The image was received but couldn't be properly encoded for analysis."
            }
        }
    }
}

/// Open, downscale, and JPEG-encode the image as base64. Oversized output
/// gets one more aggressive pass at 400px wide / quality 50.
fn encode_for_review(path: &str) -> Result<String, EncodeFailure> {
    let opened = image::open(path).map_err(|e| {
        debug!("image open failed for {}: {}", path, e);
        EncodeFailure::Open
    })?;
    // JPEG has no alpha channel; flatten before encoding.
    let mut img = DynamicImage::ImageRgb8(opened.to_rgb8());
    if img.width() > MAX_SIDE || img.height() > MAX_SIDE {
        img = img.resize(MAX_SIDE, MAX_SIDE, FilterType::Lanczos3);
    }

    let jpeg = encode_jpeg(&img, 70).map_err(|e| {
        debug!("jpeg encode failed for {}: {}", path, e);
        EncodeFailure::Encode
    })?;
    let mut b64 = base64::engine::general_purpose::STANDARD.encode(&jpeg);

    if b64.len() > MAX_BASE64_LEN {
        let height = ((400 * img.height()) / img.width()).max(1);
        let narrow = img.resize_exact(400, height, FilterType::Lanczos3);
        let jpeg = encode_jpeg(&narrow, 50).map_err(|e| {
            debug!("reduced jpeg encode failed for {}: {}", path, e);
            EncodeFailure::Encode
        })?;
        b64 = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    }
    Ok(b64)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buf);
    img.write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut cursor,
        quality,
    ))?;
    Ok(buf)
}
