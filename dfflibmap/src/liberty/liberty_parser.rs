// SPDX-License-Identifier: Apache-2.0

use super::ascii_stream::AsciiStream;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    /// A numeric word; `text` is the word as written.
    Number { value: f64, text: String },
    Identifier(String),
    Tuple(Vec<Value>),
}

impl Value {
    /// Renders the value as attribute text; tuples are rendered as
    /// `(a,b,...)`.
    pub fn to_attr_string(&self) -> String {
        match self {
            Value::String(s) | Value::Identifier(s) | Value::Number { text: s, .. } => s.clone(),
            Value::Tuple(xs) => {
                let parts: Vec<String> = xs.iter().map(Value::to_attr_string).collect();
                format!("({})", parts.join(","))
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Words that start like a number and parse as one are numbers; anything
    /// else (including `inf` and `NaN`) is an identifier.
    fn from_word(word: String) -> Value {
        let numeric_start = word
            .bytes()
            .next()
            .map_or(false, |b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'));
        match word.parse::<f64>() {
            Ok(value) if numeric_start => Value::Number { value, text: word },
            _ => Value::Identifier(word),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockAttr {
    pub attr_name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockMember {
    BlockAttr(BlockAttr),
    SubBlock(Box<Block>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub block_type: String,
    // Groups can be unnamed, e.g. `timing () { ... }`, or carry several
    // qualifiers, e.g. `ff (IQ, IQN) { ... }`.
    pub qualifiers: Vec<Value>,
    pub members: Vec<BlockMember>,
}

impl Block {
    pub fn sub_blocks(&self) -> impl Iterator<Item = &Block> {
        self.members.iter().filter_map(|m| match m {
            BlockMember::SubBlock(sb) => Some(sb.as_ref()),
            BlockMember::BlockAttr(_) => None,
        })
    }

    pub fn sub_blocks_of_type<'a>(
        &'a self,
        block_type: &'a str,
    ) -> impl Iterator<Item = &'a Block> + 'a {
        self.sub_blocks().filter(move |b| b.block_type == block_type)
    }

    /// First child group of the given type, if any.
    pub fn find_block(&self, block_type: &str) -> Option<&Block> {
        self.sub_blocks().find(|b| b.block_type == block_type)
    }

    /// First attribute with the given name, if any.
    pub fn attr(&self, attr_name: &str) -> Option<&Value> {
        self.members.iter().find_map(|m| match m {
            BlockMember::BlockAttr(attr) if attr.attr_name == attr_name => Some(&attr.value),
            _ => None,
        })
    }

    pub fn attr_string(&self, attr_name: &str) -> Option<String> {
        self.attr(attr_name).map(Value::to_attr_string)
    }

    pub fn qualifier_string(&self, index: usize) -> Option<String> {
        self.qualifiers.get(index).map(Value::to_attr_string)
    }

    /// The group name when the group carries exactly one qualifier, as `cell`
    /// and `pin` groups do.
    pub fn single_name(&self) -> Option<String> {
        if self.qualifiers.len() == 1 {
            self.qualifier_string(0)
        } else {
            None
        }
    }
}

pub struct LibertyParser<I: Iterator<Item = u8>> {
    stream: AsciiStream<I>,
}

impl<'a> LibertyParser<std::str::Bytes<'a>> {
    pub fn new(text: &'a str) -> Self {
        Self::new_from_iter(text.bytes())
    }
}

impl<I: Iterator<Item = u8>> LibertyParser<I> {
    pub fn new_from_iter(iter: I) -> Self {
        Self {
            stream: AsciiStream::new(iter),
        }
    }

    fn pop_value(&mut self, context: &str) -> Result<Value, String> {
        if self.stream.peek_is(b"\"")? {
            Ok(Value::String(self.stream.pop_string()?))
        } else {
            Ok(Value::from_word(self.stream.pop_word(context)?))
        }
    }

    /// Parses the comma-separated values after an opening paren, through the
    /// closing paren.
    fn pop_paren_values(&mut self, context: &str) -> Result<Vec<Value>, String> {
        let mut values = Vec::new();
        if self.stream.try_pop(b")")? {
            return Ok(values);
        }
        loop {
            values.push(self.pop_value(context)?);
            if self.stream.try_pop(b")")? {
                return Ok(values);
            }
            self.stream.pop_or_error(b",", context)?;
        }
    }

    fn parse_block_member(&mut self) -> Result<BlockMember, String> {
        let attr_name = self.stream.pop_word("attribute name")?;
        if self.stream.try_pop(b":")? {
            let value = self.pop_value("attribute value")?;
            // The terminating semicolon is optional at the end of a line.
            self.stream.try_pop(b";")?;
            return Ok(BlockMember::BlockAttr(BlockAttr { attr_name, value }));
        }

        self.stream.pop_or_error(b"(", "group or complex attribute start")?;
        let values = self.pop_paren_values("group qualifiers")?;
        if self.stream.peek_is(b"{")? {
            let block = self.parse_block_body(attr_name, values)?;
            return Ok(BlockMember::SubBlock(Box::new(block)));
        }
        self.stream.try_pop(b";")?;
        let value = match values.len() {
            1 => values.into_iter().next().unwrap_or(Value::Tuple(Vec::new())),
            _ => Value::Tuple(values),
        };
        Ok(BlockMember::BlockAttr(BlockAttr { attr_name, value }))
    }

    fn parse_block_body(
        &mut self,
        block_type: String,
        qualifiers: Vec<Value>,
    ) -> Result<Block, String> {
        self.stream.pop_or_error(b"{", "group body start")?;
        let mut members = Vec::new();
        while !self.stream.try_pop(b"}")? {
            if self.stream.at_eof()? {
                return Err(format!(
                    "Unexpected end of input inside `{}` group @ {}",
                    block_type,
                    self.stream.human_pos()
                ));
            }
            members.push(self.parse_block_member()?);
        }
        Ok(Block {
            block_type,
            qualifiers,
            members,
        })
    }

    /// Parses the single top-level group of a Liberty file.
    pub fn parse(&mut self) -> Result<Block, String> {
        let block_type = self.stream.pop_word("top-level group type")?;
        self.stream.pop_or_error(b"(", "top-level group qualifiers")?;
        let qualifiers = self.pop_paren_values("top-level group qualifiers")?;
        let block = self.parse_block_body(block_type, qualifiers)?;
        // Some libraries end the top-level group with a stray semicolon.
        self.stream.try_pop(b";")?;
        if !self.stream.at_eof()? {
            return Err(format!(
                "Trailing content after top-level group @ {} rest: {:?}",
                self.stream.human_pos(),
                self.stream.peek_line()
            ));
        }
        log::debug!(
            "parsed top-level `{}` group with {} members",
            block.block_type,
            block.members.len()
        );
        Ok(block)
    }
}
