//! html5ever tokenizer front end for [`TreeBuilder`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tendril::StrTendril;
use tracing::trace;

use super::{Document, TagTable, TreeBuilder};
use crate::patterns::{HTML_COMMENT, IE_CONDITIONAL};

/// Strip comments and legacy conditional blocks before tokenizing.
#[must_use]
pub fn preprocess(html: &str) -> Cow<'_, str> {
    match HTML_COMMENT.replace_all(html, "") {
        Cow::Borrowed(untouched) => IE_CONDITIONAL.replace_all(untouched, ""),
        Cow::Owned(stripped) => Cow::Owned(IE_CONDITIONAL.replace_all(&stripped, "").into_owned()),
    }
}

/// Parse HTML into a tag tree.
///
/// Never fails: tokenizer errors are skipped and the builder repairs
/// unbalanced markup.
#[must_use]
pub fn parse(html: &str, table: &TagTable, max_depth: usize) -> Document {
    let markup = preprocess(html);

    let sink = BuilderSink {
        builder: RefCell::new(TreeBuilder::new(table, max_depth)),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from(markup.as_ref()));
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    tokenizer.sink.builder.into_inner().finish()
}

/// Tokenizer state to switch to after a start tag, for elements whose
/// content is not markup.
fn raw_kind(tag: &str) -> Option<RawKind> {
    match tag {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}

struct BuilderSink<'t> {
    builder: RefCell<TreeBuilder<'t>>,
}

impl BuilderSink<'_> {
    fn tag(&self, tag: &Tag) -> TokenSinkResult<()> {
        let name: &str = &tag.name;
        match tag.kind {
            TagKind::StartTag => {
                let attributes = tag
                    .attrs
                    .iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                self.builder
                    .borrow_mut()
                    .start_tag(name, attributes, tag.self_closing);

                if !tag.self_closing {
                    if let Some(kind) = raw_kind(name) {
                        return TokenSinkResult::RawData(kind);
                    }
                }
            }
            TagKind::EndTag => self.builder.borrow_mut().end_tag(name),
        }
        TokenSinkResult::Continue
    }
}

impl TokenSink for BuilderSink<'_> {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => return self.tag(&tag),
            Token::CharacterTokens(text) => self.builder.borrow_mut().text(&text),
            Token::ParseError(err) => trace!(line = line_number, error = %err, "skipping malformed markup"),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}
