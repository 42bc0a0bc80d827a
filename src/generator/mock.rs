//! Fixed package returned when no API key is available

use super::{ContentPackage, MediaLink, ScriptSegment};

pub fn mock_package() -> ContentPackage {
    ContentPackage {
        titles: vec![
            "Mock Title 1: Your Content Journey Begins!".to_string(),
            "Mock Title 2: The Easiest Content Ever".to_string(),
            "Mock Title 3: AI-Powered Creativity".to_string(),
        ],
        script: vec![
            ScriptSegment {
                segment_title: "Introduction (Mock Data)".to_string(),
                talking_points: vec![
                    "This is a mock introduction because no API key is set.".to_string(),
                    "It demonstrates the structure of the generated content.".to_string(),
                    "You can see how talking points and media links are organized.".to_string(),
                ],
                media_links: vec![
                    MediaLink::for_keyword("welcome sign"),
                    MediaLink::for_keyword("lightbulb idea"),
                ],
            },
            ScriptSegment {
                segment_title: "Conclusion (Mock Data)".to_string(),
                talking_points: vec![
                    "To see real AI-generated content, set GEMINI_API_KEY or pass --api-key."
                        .to_string(),
                    "This concludes the mock data example.".to_string(),
                ],
                media_links: vec![MediaLink::for_keyword("thumbs up")],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_package_shape() {
        let package = mock_package();
        assert_eq!(package.titles.len(), 3);
        assert_eq!(package.script.len(), 2);
        assert_eq!(
            package.script[0].media_links[0].url,
            "https://www.pexels.com/search/welcome%20sign/"
        );
    }
}
