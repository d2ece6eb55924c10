/// How the text of an outgoing message should be parsed by the messenger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMarkup {
    #[default]
    Plain,
    /// Telegram legacy Markdown (`*bold*`, `_italic_`).
    Markdown,
}

/// Fixed-choice reply keyboard shown under the input field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
    pub one_time: bool,
}

impl ReplyKeyboard {
    /// Single row of buttons, resized to fit and hidden after a press.
    pub fn single_row(labels: &[&str]) -> Self {
        Self {
            rows: vec![labels.iter().map(|l| l.to_string()).collect()],
            resize: true,
            one_time: true,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// A reply produced by the bot core, independent of the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub markup: TextMarkup,
    pub keyboard: Option<ReplyKeyboard>,
    /// Send as a reply quoting the inbound message.
    pub quote: bool,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: TextMarkup::Plain,
            keyboard: None,
            quote: false,
        }
    }

    /// Plain text sent as a reply to the inbound message.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            quote: true,
            ..Self::text(text)
        }
    }

    pub fn markdown(mut self) -> Self {
        self.markup = TextMarkup::Markdown;
        self
    }

    pub fn with_keyboard(mut self, keyboard: ReplyKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_markdown: bool,
    pub supports_reply_keyboards: bool,
    pub max_message_len: usize,
}
