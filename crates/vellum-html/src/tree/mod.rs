//! The HTML5 tree constructor: a 24-mode insertion state machine driving the
//! tokenizer and building an element tree in the arena.
//!
//! Tree construction never fails. Malformed input produces a tree plus
//! accumulated parse errors; unexpected EOF closes whatever is still open.

mod rules;
pub(crate) mod tag_sets;

pub(crate) use tag_sets::Scope;

use crate::tokenizer::{Attribute, Doctype, State, Tag, Token, Tokenizer};
use std::collections::HashMap;
use vellum_tree::{Arena, Element, ErrorCode, Item, NamePool, ParseError};

/// Compatibility mode, decided by the DOCTYPE token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuirksMode {
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

/// The 24 insertion modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

/// A parsed HTML document: the synthetic `#document` node, the detected
/// quirks mode, and every parse error the tokenizer and tree constructor
/// recorded along the way.
pub struct HtmlDocument<'a> {
    pub document: &'a Element<'a>,
    pub quirks_mode: QuirksMode,
    pub errors: Vec<ParseError>,
}

impl<'a> HtmlDocument<'a> {
    /// The `html` root element.
    pub fn root(&self) -> Option<&'a Element<'a>> {
        self.document
            .children()
            .iter()
            .find_map(|c| c.as_element().filter(|e| e.tag() == "html"))
    }
}

/// Insertion position: a parent and an optional "insert before" sibling
/// (used by foster parenting).
#[derive(Clone, Copy)]
struct Pos<'a> {
    parent: &'a Element<'a>,
    before: Option<&'a Element<'a>>,
}

impl<'a> Pos<'a> {
    fn same(&self, other: &Pos<'a>) -> bool {
        self.parent.ptr_eq(other.parent)
            && match (self.before, other.before) {
                (None, None) => true,
                (Some(a), Some(b)) => a.ptr_eq(b),
                _ => false,
            }
    }
}

/// An entry in the list of active formatting elements. The token's name and
/// attributes are kept so the element can be cloned by the adoption agency
/// and compared by the Noah's Ark clause.
enum FormatEntry<'a> {
    Marker,
    Element(FormatElement<'a>),
}

struct FormatElement<'a> {
    el: &'a Element<'a>,
    name: String,
    attrs: Vec<Attribute>,
}

fn ptr_key(el: &Element<'_>) -> usize {
    el as *const Element<'_> as usize
}

pub(crate) struct TreeBuilder<'a, 'n, 's> {
    arena: &'a Arena,
    names: &'n NamePool<'a>,
    tokenizer: Tokenizer<'s>,

    mode: InsertionMode,
    original_mode: Option<InsertionMode>,
    template_modes: Vec<InsertionMode>,

    document: &'a Element<'a>,
    open: Vec<&'a Element<'a>>,
    formatting: Vec<FormatEntry<'a>>,
    head: Option<&'a Element<'a>>,
    form: Option<&'a Element<'a>>,

    frameset_ok: bool,
    foster_parenting: bool,
    scripting: bool,
    quirks: QuirksMode,

    /// Child → parent, for reparenting during foster parenting and the
    /// adoption agency. The value tree itself stores no parent links.
    parents: HashMap<usize, &'a Element<'a>>,

    pending_text: String,
    pending_pos: Option<Pos<'a>>,
    pending_table_text: Vec<char>,
    ignore_lf: bool,

    errors: Vec<ParseError>,
}

pub(crate) fn parse<'a>(
    arena: &'a Arena,
    names: &NamePool<'a>,
    source: &str,
) -> HtmlDocument<'a> {
    // input preprocessing: CRLF and lone CR normalize to LF
    let source: std::borrow::Cow<'_, str> = if source.contains('\r') {
        std::borrow::Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(source)
    };

    let document = Element::new_in(arena, names.intern("#document"));
    let mut builder = TreeBuilder {
        arena,
        names,
        tokenizer: Tokenizer::new(&source),
        mode: InsertionMode::Initial,
        original_mode: None,
        template_modes: Vec::new(),
        document,
        open: Vec::new(),
        formatting: Vec::new(),
        head: None,
        form: None,
        frameset_ok: true,
        foster_parenting: false,
        scripting: false,
        quirks: QuirksMode::NoQuirks,
        parents: HashMap::new(),
        pending_text: String::new(),
        pending_pos: None,
        pending_table_text: Vec::new(),
        ignore_lf: false,
        errors: Vec::new(),
    };
    builder.run();

    let mut errors = builder.tokenizer.take_errors();
    errors.extend(builder.errors);
    HtmlDocument {
        document,
        quirks_mode: builder.quirks,
        errors,
    }
}

impl<'a, 'n, 's> TreeBuilder<'a, 'n, 's> {
    fn run(&mut self) {
        loop {
            let token = self.tokenizer.next_token();
            let done = token.is_eof();

            let token = match token {
                Token::Character(c) => {
                    if std::mem::replace(&mut self.ignore_lf, false) && c == '\n' {
                        continue;
                    }
                    Token::Character(c)
                }
                other => {
                    self.ignore_lf = false;
                    other
                }
            };

            self.process(token);
            if done {
                break;
            }
        }
        self.flush_text();
    }

    fn error(&mut self, message: &str) {
        let (line, column) = self.tokenizer.position();
        self.errors.push(ParseError::new(
            ErrorCode::UnexpectedToken,
            message,
            line,
            column,
        ));
    }

    // node plumbing

    fn current(&self) -> &'a Element<'a> {
        self.open.last().copied().unwrap_or(self.document)
    }

    fn intern(&self, s: &str) -> vellum_tree::Name<'a> {
        self.names.intern(s)
    }

    /// The appropriate place for inserting a node, honoring foster parenting.
    fn appropriate_place(&self, override_target: Option<&'a Element<'a>>) -> Pos<'a> {
        let target = override_target.unwrap_or_else(|| self.current());

        if self.foster_parenting && tag_sets::fosters(target.tag().as_str()) {
            if let Some(idx) = self.open.iter().rposition(|e| e.tag() == "table") {
                let table = self.open[idx];
                let parent = self
                    .parents
                    .get(&ptr_key(table))
                    .copied()
                    .unwrap_or(self.document);
                return Pos {
                    parent,
                    before: Some(table),
                };
            }
            // fragment-ish case: no table on the stack
            return Pos {
                parent: self.open.first().copied().unwrap_or(self.document),
                before: None,
            };
        }

        Pos {
            parent: target,
            before: None,
        }
    }

    fn insert_at(&mut self, pos: Pos<'a>, item: Item<'a>) {
        match pos.before {
            Some(reference) => pos.parent.insert_child_before(reference, item),
            None => pos.parent.add_child(item),
        }
        if let Item::Element(el) = item {
            self.parents.insert(ptr_key(el), pos.parent);
        }
    }

    /// Detach an element from its recorded parent, if any.
    fn detach(&mut self, el: &'a Element<'a>) {
        if let Some(parent) = self.parents.remove(&ptr_key(el)) {
            parent.remove_child_element(el);
        }
    }

    fn create_element(&mut self, name: &str, attrs: &[Attribute]) -> &'a Element<'a> {
        let el = Element::new_in(self.arena, self.intern(name));
        for attr in attrs {
            el.set_attr_if_missing(
                self.intern(&attr.name),
                Item::String(self.arena.alloc_str(&attr.value)),
            );
        }
        el
    }

    /// Insert an element for a start-tag token and push it onto the stack.
    fn insert_element(&mut self, tag: &Tag) -> &'a Element<'a> {
        self.flush_text();
        let el = self.create_element(&tag.name, &tag.attrs);
        let pos = self.appropriate_place(None);
        self.insert_at(pos, Item::Element(el));
        self.open.push(el);
        el
    }

    /// Insert a void (or self-closing-tolerated) element without keeping it
    /// on the stack.
    fn insert_void_element(&mut self, tag: &Tag) -> &'a Element<'a> {
        let el = self.insert_element(tag);
        self.open.pop();
        el
    }

    fn insert_comment(&mut self, data: &str) {
        self.flush_text();
        let el = Element::new_in(self.arena, self.intern("!comment"));
        el.add_child(Item::String(self.arena.alloc_str(data)));
        let pos = self.appropriate_place(None);
        self.insert_at(pos, Item::Element(el));
    }

    fn insert_comment_in(&mut self, data: &str, parent: &'a Element<'a>) {
        self.flush_text();
        let el = Element::new_in(self.arena, self.intern("!comment"));
        el.add_child(Item::String(self.arena.alloc_str(data)));
        parent.add_child(Item::Element(el));
        self.parents.insert(ptr_key(el), parent);
    }

    fn insert_doctype(&mut self, doctype: &Doctype) {
        let el = Element::new_in(self.arena, self.intern("!doctype"));
        if let Some(name) = &doctype.name {
            el.set_attr(self.intern("name"), Item::String(self.arena.alloc_str(name)));
        }
        if let Some(public_id) = &doctype.public_id {
            el.set_attr(
                self.intern("public"),
                Item::String(self.arena.alloc_str(public_id)),
            );
        }
        if let Some(system_id) = &doctype.system_id {
            el.set_attr(
                self.intern("system"),
                Item::String(self.arena.alloc_str(system_id)),
            );
        }
        self.document.add_child(Item::Element(el));
    }

    // text accumulation

    /// Queue a character at the current insertion place, merging runs that
    /// target the same position into a single string child.
    fn append_char(&mut self, c: char) {
        let pos = self.appropriate_place(None);
        match &self.pending_pos {
            Some(existing) if existing.same(&pos) => {}
            _ => {
                self.flush_text();
                self.pending_pos = Some(pos);
            }
        }
        self.pending_text.push(c);
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            self.pending_pos = None;
            return;
        }
        let text = self.arena.alloc_str(&self.pending_text);
        self.pending_text.clear();
        if let Some(pos) = self.pending_pos.take() {
            match pos.before {
                Some(reference) => pos.parent.insert_child_before(reference, Item::String(text)),
                None => pos.parent.add_child(Item::String(text)),
            }
        }
    }

    // stack queries

    fn has_in_scope(&self, name: &str, scope: Scope) -> bool {
        for el in self.open.iter().rev() {
            if el.tag() == *name {
                return true;
            }
            if tag_sets::is_scope_boundary(scope, el.tag().as_str()) {
                return false;
            }
        }
        false
    }

    fn element_in_scope(&self, target: &'a Element<'a>, scope: Scope) -> bool {
        for el in self.open.iter().rev() {
            if el.ptr_eq(target) {
                return true;
            }
            if tag_sets::is_scope_boundary(scope, el.tag().as_str()) {
                return false;
            }
        }
        false
    }

    fn pop_until(&mut self, name: &str) {
        while let Some(el) = self.open.pop() {
            if el.tag() == *name {
                break;
            }
        }
    }

    fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(el) = self.open.pop() {
            if names.contains(&el.tag().as_str()) {
                break;
            }
        }
    }

    fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(&el) = self.open.last() {
            let tag = el.tag();
            if tag_sets::is_implied_end(tag.as_str()) && Some(tag.as_str()) != except {
                self.open.pop();
            } else {
                break;
            }
        }
    }

    fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if self.current().tag() != "p" {
            self.error("unexpected-open-element-while-closing-p");
        }
        self.pop_until("p");
    }

    /// Clear the stack back to a table/table-body/row context.
    fn clear_stack_to_context(&mut self, context: &[&str]) {
        while let Some(&el) = self.open.last() {
            if context.contains(&el.tag().as_str()) || el.tag() == "html" {
                break;
            }
            self.open.pop();
        }
    }

    // active formatting elements

    fn formatting_index_of(&self, el: &'a Element<'a>) -> Option<usize> {
        self.formatting.iter().position(|e| match e {
            FormatEntry::Element(f) => f.el.ptr_eq(el),
            FormatEntry::Marker => false,
        })
    }

    fn push_marker(&mut self) {
        self.formatting.push(FormatEntry::Marker);
    }

    /// Push a formatting element, applying the Noah's Ark clause: at most
    /// three identical entries (same name and attribute set) after the last
    /// marker.
    fn push_formatting(&mut self, el: &'a Element<'a>, tag: &Tag) {
        let mut identical = Vec::new();
        for (i, entry) in self.formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => break,
                FormatEntry::Element(f) => {
                    if f.name == tag.name && f.attrs == tag.attrs {
                        identical.push(i);
                    }
                }
            }
        }
        if identical.len() >= 3 {
            // remove the earliest
            if let Some(&earliest) = identical.last() {
                self.formatting.remove(earliest);
            }
        }
        self.formatting.push(FormatEntry::Element(FormatElement {
            el,
            name: tag.name.clone(),
            attrs: tag.attrs.clone(),
        }));
    }

    /// Drop formatting entries up to and including the last marker.
    fn clear_formatting_to_marker(&mut self) {
        while let Some(entry) = self.formatting.pop() {
            if matches!(entry, FormatEntry::Marker) {
                break;
            }
        }
    }

    fn reconstruct_formatting(&mut self) {
        let last_is_open = match self.formatting.last() {
            None | Some(FormatEntry::Marker) => return,
            Some(FormatEntry::Element(f)) => self.open.iter().any(|e| e.ptr_eq(f.el)),
        };
        if last_is_open {
            return;
        }

        // walk back to the first entry that is a marker or already open
        let mut index = self.formatting.len() - 1;
        loop {
            if index == 0 {
                break;
            }
            index -= 1;
            let open = match &self.formatting[index] {
                FormatEntry::Marker => true,
                FormatEntry::Element(f) => self.open.iter().any(|e| e.ptr_eq(f.el)),
            };
            if open {
                index += 1;
                break;
            }
        }

        while index < self.formatting.len() {
            let (name, attrs) = match &self.formatting[index] {
                FormatEntry::Element(f) => (f.name.clone(), f.attrs.clone()),
                FormatEntry::Marker => {
                    index += 1;
                    continue;
                }
            };
            self.flush_text();
            let el = self.create_element(&name, &attrs);
            let pos = self.appropriate_place(None);
            self.insert_at(pos, Item::Element(el));
            self.open.push(el);
            if let FormatEntry::Element(f) = &mut self.formatting[index] {
                f.el = el;
            }
            index += 1;
        }
    }

    fn clone_formatting_entry(&mut self, index: usize) -> &'a Element<'a> {
        let (name, attrs) = match &self.formatting[index] {
            FormatEntry::Element(f) => (f.name.clone(), f.attrs.clone()),
            FormatEntry::Marker => unreachable!("cloning a marker"),
        };
        self.create_element(&name, &attrs)
    }

    // the adoption agency algorithm

    /// Run the adoption agency for an end tag naming a formatting element.
    /// Outer loop bounded to 8 iterations, inner to 3 list-removals, per the
    /// WHATWG algorithm.
    fn adoption_agency(&mut self, subject: &str) {
        self.flush_text();

        // Trivial case: current node matches and is not an active formatting
        // element.
        if let Some(&current) = self.open.last() {
            if current.tag() == *subject && self.formatting_index_of(current).is_none() {
                self.open.pop();
                return;
            }
        }

        for _ in 0..8 {
            // the last matching formatting element after the last marker
            let mut fmt_idx = None;
            for (i, entry) in self.formatting.iter().enumerate().rev() {
                match entry {
                    FormatEntry::Marker => break,
                    FormatEntry::Element(f) if f.name == subject => {
                        fmt_idx = Some(i);
                        break;
                    }
                    FormatEntry::Element(_) => {}
                }
            }
            let Some(fmt_idx) = fmt_idx else {
                self.any_other_end_tag(subject);
                return;
            };
            let fmt_el = match &self.formatting[fmt_idx] {
                FormatEntry::Element(f) => f.el,
                FormatEntry::Marker => unreachable!(),
            };

            let Some(stack_idx) = self.open.iter().position(|e| e.ptr_eq(fmt_el)) else {
                self.error("adoption-agency-element-not-open");
                self.formatting.remove(fmt_idx);
                return;
            };
            if !self.element_in_scope(fmt_el, Scope::Default) {
                self.error("adoption-agency-element-not-in-scope");
                return;
            }
            if !self.current().ptr_eq(fmt_el) {
                self.error("adoption-agency-element-not-current");
            }

            // furthest block: lowest special element above the formatting one
            let fb_idx = self.open[stack_idx + 1..]
                .iter()
                .position(|e| tag_sets::is_special(e.tag().as_str()))
                .map(|off| stack_idx + 1 + off);
            let Some(fb_idx) = fb_idx else {
                self.open.truncate(stack_idx);
                self.formatting.remove(fmt_idx);
                return;
            };
            let furthest_block = self.open[fb_idx];
            let common_ancestor = if stack_idx == 0 {
                self.document
            } else {
                self.open[stack_idx - 1]
            };
            let mut bookmark = fmt_idx;

            // inner loop: rebuild the chain between the furthest block and
            // the formatting element
            let mut node_idx = fb_idx;
            let mut last_node = furthest_block;
            let mut inner = 0u32;
            loop {
                inner += 1;
                node_idx -= 1;
                if node_idx == stack_idx {
                    break;
                }
                let node = self.open[node_idx];

                if inner > 3 {
                    if let Some(nf) = self.formatting_index_of(node) {
                        self.formatting.remove(nf);
                        if nf < bookmark {
                            bookmark -= 1;
                        }
                    }
                }
                let Some(nf) = self.formatting_index_of(node) else {
                    self.open.remove(node_idx);
                    continue;
                };

                let clone = self.clone_formatting_entry(nf);
                if let FormatEntry::Element(f) = &mut self.formatting[nf] {
                    f.el = clone;
                }
                self.open[node_idx] = clone;
                if last_node.ptr_eq(furthest_block) {
                    bookmark = nf + 1;
                }
                self.detach(last_node);
                clone.add_child(Item::Element(last_node));
                self.parents.insert(ptr_key(last_node), clone);
                last_node = clone;
            }

            self.detach(last_node);
            let pos = self.appropriate_place(Some(common_ancestor));
            self.insert_at(pos, Item::Element(last_node));

            // inner-loop removals may have shifted the entry's index
            let Some(fmt_idx) = self.formatting_index_of(fmt_el) else {
                return;
            };

            // move the furthest block's children into a fresh clone of the
            // formatting element, then hang the clone off the furthest block
            let clone = self.clone_formatting_entry(fmt_idx);
            furthest_block.move_children_to(clone);
            for child in clone.child_elements() {
                self.parents.insert(ptr_key(child), clone);
            }
            furthest_block.add_child(Item::Element(clone));
            self.parents.insert(ptr_key(clone), furthest_block);

            let (name, attrs) = match &self.formatting[fmt_idx] {
                FormatEntry::Element(f) => (f.name.clone(), f.attrs.clone()),
                FormatEntry::Marker => unreachable!(),
            };
            self.formatting.remove(fmt_idx);
            let bookmark = if fmt_idx < bookmark {
                bookmark - 1
            } else {
                bookmark
            };
            let at = bookmark.min(self.formatting.len());
            self.formatting.insert(
                at,
                FormatEntry::Element(FormatElement {
                    el: clone,
                    name,
                    attrs,
                }),
            );

            if let Some(i) = self.open.iter().position(|e| e.ptr_eq(fmt_el)) {
                self.open.remove(i);
            }
            if let Some(i) = self.open.iter().position(|e| e.ptr_eq(furthest_block)) {
                self.open.insert(i + 1, clone);
            }
        }
    }

    /// The in-body "any other end tag" walk.
    fn any_other_end_tag(&mut self, name: &str) {
        let mut idx = self.open.len();
        while idx > 0 {
            idx -= 1;
            let node = self.open[idx];
            if node.tag() == *name {
                self.generate_implied_end_tags(Some(name));
                if !self.current().ptr_eq(node) {
                    self.error("unexpected-end-tag-with-open-elements");
                }
                self.open.truncate(idx);
                return;
            }
            if tag_sets::is_special(node.tag().as_str()) {
                self.error("unexpected-end-tag");
                return;
            }
        }
    }

    // raw-text element handling

    /// The generic raw-text / RCDATA parsing algorithm: insert the element,
    /// switch the tokenizer, and park the current mode.
    fn parse_raw_text(&mut self, tag: &Tag, state: State) {
        self.insert_element(tag);
        self.tokenizer.set_state(state);
        self.original_mode = Some(self.mode);
        self.mode = InsertionMode::Text;
    }

    // quirks detection

    fn quirks_from_doctype(&self, doctype: &Doctype) -> QuirksMode {
        const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
            "+//silmaril//dtd html pro v0r11 19970101//",
            "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
            "-//as//dtd html 3.0 aswedit + extensions//",
            "-//ietf//dtd html 2.0 level 1//",
            "-//ietf//dtd html 2.0 level 2//",
            "-//ietf//dtd html 2.0 strict level 1//",
            "-//ietf//dtd html 2.0 strict level 2//",
            "-//ietf//dtd html 2.0 strict//",
            "-//ietf//dtd html 2.0//",
            "-//ietf//dtd html 2.1e//",
            "-//ietf//dtd html 3.0//",
            "-//ietf//dtd html 3.2 final//",
            "-//ietf//dtd html 3.2//",
            "-//ietf//dtd html 3//",
            "-//ietf//dtd html level 0//",
            "-//ietf//dtd html level 1//",
            "-//ietf//dtd html level 2//",
            "-//ietf//dtd html level 3//",
            "-//ietf//dtd html strict level 0//",
            "-//ietf//dtd html strict level 1//",
            "-//ietf//dtd html strict level 2//",
            "-//ietf//dtd html strict level 3//",
            "-//ietf//dtd html strict//",
            "-//ietf//dtd html//",
            "-//metrius//dtd metrius presentational//",
            "-//microsoft//dtd internet explorer 2.0 html strict//",
            "-//microsoft//dtd internet explorer 2.0 html//",
            "-//microsoft//dtd internet explorer 2.0 tables//",
            "-//microsoft//dtd internet explorer 3.0 html strict//",
            "-//microsoft//dtd internet explorer 3.0 html//",
            "-//microsoft//dtd internet explorer 3.0 tables//",
            "-//netscape comm. corp.//dtd html//",
            "-//netscape comm. corp.//dtd strict html//",
            "-//o'reilly and associates//dtd html 2.0//",
            "-//o'reilly and associates//dtd html extended 1.0//",
            "-//spyglass//dtd html 2.0 extended//",
            "-//sun microsystems corp.//dtd hotjava html//",
            "-//sun microsystems corp.//dtd hotjava strict html//",
            "-//w3c//dtd html 3 1995-03-24//",
            "-//w3c//dtd html 3.2 draft//",
            "-//w3c//dtd html 3.2 final//",
            "-//w3c//dtd html 3.2//",
            "-//w3c//dtd html 3.2s draft//",
            "-//w3c//dtd html 4.0 frameset//",
            "-//w3c//dtd html 4.0 transitional//",
            "-//w3c//dtd html experimental 19960712//",
            "-//w3c//dtd html experimental 970421//",
            "-//w3c//dtd w3 html//",
            "-//w3o//dtd w3 html 3.0//",
            "-//webtechs//dtd mozilla html 2.0//",
            "-//webtechs//dtd mozilla html//",
        ];

        if doctype.force_quirks {
            return QuirksMode::Quirks;
        }
        if doctype.name.as_deref() != Some("html") {
            return QuirksMode::Quirks;
        }
        let public = doctype.public_id.as_deref().map(|s| s.to_ascii_lowercase());
        let system = doctype.system_id.as_deref().map(|s| s.to_ascii_lowercase());

        if let Some(public) = &public {
            if public == "-//w3o//dtd w3 html strict 3.0//en//"
                || public == "-/w3c/dtd html 4.0 transitional/en"
                || public == "html"
            {
                return QuirksMode::Quirks;
            }
            if QUIRKY_PUBLIC_PREFIXES.iter().any(|p| public.starts_with(p)) {
                return QuirksMode::Quirks;
            }
            let framesetish = public.starts_with("-//w3c//dtd html 4.01 frameset//")
                || public.starts_with("-//w3c//dtd html 4.01 transitional//");
            if framesetish {
                return if system.is_none() {
                    QuirksMode::Quirks
                } else {
                    QuirksMode::LimitedQuirks
                };
            }
            if public.starts_with("-//w3c//dtd xhtml 1.0 frameset//")
                || public.starts_with("-//w3c//dtd xhtml 1.0 transitional//")
            {
                return QuirksMode::LimitedQuirks;
            }
        }
        if system.as_deref() == Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd") {
            return QuirksMode::Quirks;
        }
        QuirksMode::NoQuirks
    }
}
