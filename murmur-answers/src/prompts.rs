//! Named prompt templates for opinion mining.
use std::fmt;

/// A prompt shape understood by the answer-synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate<'a> {
    /// Verbatim user quotes about `topic` from one forum.
    RedditDiscussions {
        forum: &'a str,
        topic: &'a str,
        num_examples: u32,
    },
    /// Pain points for a product category across the platform.
    PainPoints {
        category: &'a str,
        keywords: &'a str,
    },
}

impl PromptTemplate<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::RedditDiscussions { .. } => "reddit_discussions",
            PromptTemplate::PainPoints { .. } => "pain_points",
        }
    }

    pub fn render(&self) -> String {
        match *self {
            PromptTemplate::RedditDiscussions {
                forum,
                topic,
                num_examples,
            } => format!(
                "
Search Reddit's r/{forum} for discussions about {topic}.

Find {num_examples} real user comments or posts that mention:
- Frustrations
- Problems they're facing
- What they wish existed
- Complaints about current solutions

For each, provide:
1. The actual quote (verbatim if possible)
2. The main frustration
3. Context

Format as a list with quotes.
"
            ),
            PromptTemplate::PainPoints { category, keywords } => format!(
                "
Search Reddit for people discussing problems with {category}.

Keywords to search: {keywords}

Find 10 examples of people expressing:
- Frustration with current products
- Unmet needs
- Desired features that don't exist
- Complaints

Return actual user quotes and the subreddit they're from.
"
            ),
        }
    }
}

impl fmt::Display for PromptTemplate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
