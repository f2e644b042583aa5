//! # Image Path Conventions
//!
//! ```text
//! images/{CODE}.png                 primary image
//! Moreimages/{CODE}({N}){ext}       gallery, N = 1..=8
//!                                   ext tried in order .jpg .png .jpeg
//! ```
//!
//! Paths are relative to the image root and always use `/`.

/// Gallery extensions in probe order.
pub const VARIANT_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".jpeg"];

pub fn primary_path(code: &str) -> String {
    format!("images/{code}.png")
}

pub fn variant_path(code: &str, index: u32, extension: &str) -> String {
    format!("Moreimages/{code}({index}){extension}")
}

/// Every candidate for gallery slot `index`, in probe order.
pub fn variant_candidates(code: &str, index: u32) -> Vec<String> {
    VARIANT_EXTENSIONS
        .iter()
        .map(|ext| variant_path(code, index, ext))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(primary_path("X1"), "images/X1.png");
        assert_eq!(
            variant_candidates("X1", 2),
            vec![
                "Moreimages/X1(2).jpg",
                "Moreimages/X1(2).png",
                "Moreimages/X1(2).jpeg"
            ]
        );
    }
}
