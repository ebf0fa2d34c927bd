//! Authentication bodies: controller, routes, models and email flows
//!
//! The controller is framework-agnostic and resolves to `{ status, body }`;
//! route modules adapt it to each framework. Models share one interface
//! (`create`, `findOne`, `update`, `removeWhere` plus named finders) across
//! the relational, document-store and in-memory storage families.

use super::framework_variant;
use crate::assemble::naming::{to_kebab_case, to_upper_camel_case};
use crate::config::{EmailProvider, Feature, Framework, ValidConfig};

pub fn auth_controller(config: &ValidConfig) -> String {
    let otp = config.has(Feature::EmailOtp);
    let reset = config.has(Feature::PasswordReset);

    let mut out = String::from(
        "const bcrypt = require('bcryptjs');\nconst jwt = require('jsonwebtoken');\nconst User = require('../models/User');\n",
    );
    if otp {
        out.push_str("const otp = require('../services/otp.service');\n");
    }
    if reset {
        out.push_str("const passwordReset = require('../services/password-reset.service');\n");
    }

    out.push_str(
        r#"
const fail = (status, error) => ({ status, body: { error } });

function signToken(user) {
  return jwt.sign({ sub: String(user.id) }, process.env.JWT_SECRET, {
    expiresIn: process.env.JWT_EXPIRES_IN || '1h',
  });
}

function publicUser(user) {
  return { id: String(user.id), email: user.email, verified: Boolean(user.verified) };
}

async function register({ email, password } = {}) {
  if (!email || !password) return fail(400, 'Email and password are required');
  if (await User.findByEmail(email)) return fail(409, 'Email already registered');

  const passwordHash = await bcrypt.hash(password, 10);
"#,
    );
    if otp {
        out.push_str(
            r#"  const user = await User.create({ email, passwordHash, verified: false });
  await otp.issueOtp(user);
  return { status: 201, body: { user: publicUser(user), verification: 'pending' } };
}
"#,
        );
    } else {
        out.push_str(
            r#"  const user = await User.create({ email, passwordHash, verified: true });
  return { status: 201, body: { user: publicUser(user), token: signToken(user) } };
}
"#,
        );
    }

    out.push_str(
        r#"
async function login({ email, password } = {}) {
  const user = email ? await User.findByEmail(email) : null;
  if (!user || !(await bcrypt.compare(password || '', user.passwordHash))) {
    return fail(401, 'Invalid credentials');
  }
"#,
    );
    if otp {
        out.push_str("  if (!user.verified) return fail(403, 'Email not verified');\n");
    }
    out.push_str(
        r#"  return { status: 200, body: { user: publicUser(user), token: signToken(user) } };
}

async function me(userId) {
  const user = await User.findById(userId);
  if (!user) return fail(404, 'User not found');
  return { status: 200, body: { user: publicUser(user) } };
}
"#,
    );

    let mut exports = vec!["register", "login", "me"];
    if otp {
        out.push_str(
            r#"
async function verifyOtp({ email, code } = {}) {
  const user = email ? await User.findByEmail(email) : null;
  if (!user || !(await otp.verifyOtp(user, code))) return fail(400, 'Invalid or expired code');
  const verified = await User.update(user.id, { verified: true });
  return { status: 200, body: { user: publicUser(verified), token: signToken(verified) } };
}

async function resendOtp({ email } = {}) {
  const user = email ? await User.findByEmail(email) : null;
  if (user && !user.verified) await otp.issueOtp(user);
  return { status: 202, body: { status: 'sent' } };
}
"#,
        );
        exports.extend(["verifyOtp", "resendOtp"]);
    }
    if reset {
        out.push_str(
            r#"
async function forgotPassword({ email } = {}) {
  if (email) await passwordReset.requestReset(email);
  return { status: 202, body: { status: 'sent' } };
}

async function resetPassword({ token, password } = {}) {
  if (!token || !password || !(await passwordReset.resetPassword(token, password))) {
    return fail(400, 'Invalid or expired token');
  }
  return { status: 200, body: { status: 'updated' } };
}
"#,
        );
        exports.extend(["forgotPassword", "resetPassword"]);
    }

    out.push_str(&format!("\nmodule.exports = {{ {} }};\n", exports.join(", ")));
    out
}

/// One endpoint under `/api/auth`
struct Route {
    method: &'static str,
    path: &'static str,
    action: &'static str,
    schema: &'static str,
    /// Handler takes the authenticated user id instead of the body
    authed: bool,
}

fn routes(config: &ValidConfig) -> Vec<Route> {
    let post = |path: &'static str, action: &'static str, schema: &'static str| Route {
        method: "post",
        path,
        action,
        schema,
        authed: false,
    };

    let mut routes = vec![
        post("/register", "register", "registerSchema"),
        post("/login", "login", "loginSchema"),
        Route {
            method: "get",
            path: "/me",
            action: "me",
            schema: "",
            authed: true,
        },
    ];
    if config.has(Feature::EmailOtp) {
        routes.push(post("/verify-otp", "verifyOtp", "verifyOtpSchema"));
        routes.push(post("/resend-otp", "resendOtp", "emailSchema"));
    }
    if config.has(Feature::PasswordReset) {
        routes.push(post("/forgot-password", "forgotPassword", "emailSchema"));
        routes.push(post("/reset-password", "resetPassword", "resetPasswordSchema"));
    }
    routes
}

pub fn auth_routes(variant: &str, config: &ValidConfig) -> Option<String> {
    let framework = framework_variant(variant)?;
    let validated = config.has(Feature::Validation);

    let mut out = String::new();
    if framework == Framework::Express {
        out.push_str("const express = require('express');\n");
    }
    out.push_str("const controller = require('../controllers/auth.controller');\n");
    out.push_str("const { requireAuth } = require('../middleware/auth.middleware');\n");
    if validated {
        out.push_str("const { validate } = require('../middleware/validate.middleware');\n");
        out.push_str("const schemas = require('../validators/auth.schemas');\n");
    }
    out.push('\n');

    out.push_str(match framework {
        Framework::Express => {
            r#"const handle = (action) => async (req, res, next) => {
  try {
    const result = await action(req);
    res.status(result.status).json(result.body);
  } catch (err) {
    next(err);
  }
};

function applyAuthRoutes(app) {
  const router = express.Router();
"#
        }
        Framework::Fastify => {
            r#"const handle = (action) => async (request, reply) => {
  const result = await action(request);
  return reply.code(result.status).send(result.body);
};

function applyAuthRoutes(app) {
"#
        }
        Framework::Koa => {
            r#"const handle = (action) => async (ctx) => {
  const result = await action(ctx);
  ctx.status = result.status;
  ctx.body = result.body;
};

function applyAuthRoutes(router) {
"#
        }
        Framework::Hapi => {
            r#"const handle = (action) => async (request, h) => {
  const result = await action(request);
  return h.response(result.body).code(result.status);
};

function applyAuthRoutes(server) {
"#
        }
    });

    for route in routes(config) {
        let (param, arg) = match (framework, route.authed) {
            (Framework::Express, false) => ("req", "req.body"),
            (Framework::Express, true) => ("req", "req.userId"),
            (Framework::Fastify, false) => ("request", "request.body"),
            (Framework::Fastify, true) => ("request", "request.userId"),
            (Framework::Koa, false) => ("ctx", "ctx.request.body"),
            (Framework::Koa, true) => ("ctx", "ctx.state.userId"),
            (Framework::Hapi, false) => ("request", "request.payload"),
            (Framework::Hapi, true) => ("request", "request.pre.userId"),
        };
        let handler = format!("handle(({}) => controller.{}({}))", param, route.action, arg);
        let guard = if route.authed {
            Some("requireAuth".to_string())
        } else if validated {
            Some(format!("validate(schemas.{})", route.schema))
        } else {
            None
        };

        out.push_str(&match framework {
            Framework::Express => format!(
                "  router.{}('{}', {}{});\n",
                route.method,
                route.path,
                guard.map(|g| g + ", ").unwrap_or_default(),
                handler
            ),
            Framework::Fastify => format!(
                "  app.{}('/api/auth{}', {}{});\n",
                route.method,
                route.path,
                guard
                    .map(|g| format!("{{ preHandler: {} }}, ", g))
                    .unwrap_or_default(),
                handler
            ),
            Framework::Koa => format!(
                "  router.{}('/api/auth{}', {}{});\n",
                route.method,
                route.path,
                guard.map(|g| g + ", ").unwrap_or_default(),
                handler
            ),
            Framework::Hapi => {
                let options = if route.authed {
                    "    options: { pre: [{ method: requireAuth, assign: 'userId' }] },\n".to_string()
                } else if let Some(g) = guard {
                    format!("    options: {{ validate: {{ payload: {} }} }},\n", g)
                } else {
                    String::new()
                };
                format!(
                    "  server.route({{\n    method: '{}',\n    path: '/api/auth{}',\n{}    handler: {},\n  }});\n",
                    route.method.to_uppercase(),
                    route.path,
                    options,
                    handler
                )
            }
        });
    }

    if framework == Framework::Express {
        out.push_str("  app.use('/api/auth', router);\n");
    }
    out.push_str("}\n\nmodule.exports = { applyAuthRoutes };\n");
    Some(out)
}

const TOKEN_HEAD: &str = r#"const jwt = require('jsonwebtoken');

/** User id carried by a `Bearer` authorization header, or null */
function verifyToken(header) {
  const [scheme, token] = (header || '').split(' ');
  if (scheme !== 'Bearer' || !token) return null;
  try {
    return jwt.verify(token, process.env.JWT_SECRET).sub;
  } catch (err) {
    return null;
  }
}
"#;

pub fn auth_middleware(variant: &str) -> Option<String> {
    let body = match framework_variant(variant)? {
        Framework::Express => {
            r#"
function requireAuth(req, res, next) {
  const userId = verifyToken(req.get('authorization'));
  if (!userId) {
    return res.status(401).json({ error: 'Unauthorized' });
  }
  req.userId = userId;
  next();
}
"#
        }
        Framework::Fastify => {
            r#"
async function requireAuth(request, reply) {
  const userId = verifyToken(request.headers.authorization);
  if (!userId) {
    reply.code(401).send({ error: 'Unauthorized' });
    return reply;
  }
  request.userId = userId;
}
"#
        }
        Framework::Koa => {
            r#"
async function requireAuth(ctx, next) {
  const userId = verifyToken(ctx.get('authorization'));
  if (!userId) {
    ctx.status = 401;
    ctx.body = { error: 'Unauthorized' };
    return;
  }
  ctx.state.userId = userId;
  await next();
}
"#
        }
        Framework::Hapi => {
            r#"
/** Route prerequisite; assigns the user id or answers 401 */
function requireAuth(request, h) {
  const userId = verifyToken(request.headers.authorization);
  if (!userId) {
    return h.response({ error: 'Unauthorized' }).code(401).takeover();
  }
  return userId;
}
"#
        }
    };
    Some(format!(
        "{}{}\nmodule.exports = {{ requireAuth, verifyToken }};\n",
        TOKEN_HEAD, body
    ))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Str,
    Bool,
    Int,
    Date,
    /// Id of a `User` record
    UserRef,
}

struct Field {
    name: &'static str,
    kind: Kind,
    unique: bool,
}

const fn field(name: &'static str, kind: Kind) -> Field {
    Field {
        name,
        kind,
        unique: false,
    }
}

struct Model {
    entity: &'static str,
    table: &'static str,
    fields: &'static [Field],
    /// Named exports layered on the shared interface
    finders: &'static str,
}

const USER: Model = Model {
    entity: "user",
    table: "users",
    fields: &[
        Field {
            name: "email",
            kind: Kind::Str,
            unique: true,
        },
        field("passwordHash", Kind::Str),
        field("verified", Kind::Bool),
    ],
    finders: "  findByEmail: (email) => findOne({ email }),\n  findById: (id) => findOne({ id }),\n",
};

const OTP_CODE: Model = Model {
    entity: "otp-code",
    table: "otp_codes",
    fields: &[
        field("userId", Kind::UserRef),
        field("codeHash", Kind::Str),
        field("expiresAt", Kind::Date),
        field("attempts", Kind::Int),
    ],
    finders: "  findForUser: (userId) => findOne({ userId }),\n  removeForUser: (userId) => removeWhere({ userId }),\n",
};

const RESET_TOKEN: Model = Model {
    entity: "reset-token",
    table: "reset_tokens",
    fields: &[
        field("userId", Kind::UserRef),
        Field {
            name: "tokenHash",
            kind: Kind::Str,
            unique: true,
        },
        field("expiresAt", Kind::Date),
    ],
    finders: "  findByHash: (tokenHash) => findOne({ tokenHash }),\n  removeForUser: (userId) => removeWhere({ userId }),\n",
};

pub fn user_model(variant: &str) -> Option<String> {
    model(&USER, variant)
}

pub fn otp_model(variant: &str) -> Option<String> {
    model(&OTP_CODE, variant)
}

pub fn reset_token_model(variant: &str) -> Option<String> {
    model(&RESET_TOKEN, variant)
}

fn model(model: &Model, variant: &str) -> Option<String> {
    let mut out = match variant {
        "relational" => relational_model(model),
        "document-store" => document_model(model),
        "memory" => memory_model(model),
        _ => return None,
    };
    out.push_str(&format!(
        "\nmodule.exports = {{\n  create,\n  findOne,\n  update,\n  removeWhere,\n{}}};\n",
        model.finders
    ));
    Some(out)
}

fn column(name: &str) -> String {
    to_kebab_case(name).replace('-', "_")
}

fn relational_model(model: &Model) -> String {
    let columns = model
        .fields
        .iter()
        .map(|f| format!("  {}: '{}',", f.name, column(f.name)))
        .collect::<Vec<_>>()
        .join("\n");

    let definitions = model
        .fields
        .iter()
        .map(|f| {
            let col = column(f.name);
            let mut def = match f.kind {
                Kind::Str => format!("table.string('{}').notNullable()", col),
                Kind::Bool => format!("table.boolean('{}').notNullable().defaultTo(false)", col),
                Kind::Int => format!("table.integer('{}').notNullable().defaultTo(0)", col),
                Kind::Date => format!("table.timestamp('{}').notNullable()", col),
                Kind::UserRef => format!("table.integer('{}').notNullable().index()", col),
            };
            if f.unique {
                def.push_str(".unique()");
            }
            format!("        {};", def)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let coercions = model
        .fields
        .iter()
        .filter_map(|f| match f.kind {
            Kind::Bool => Some(format!("  record.{0} = Boolean(record.{0});", f.name)),
            Kind::Date => Some(format!("  record.{0} = new Date(record.{0});", f.name)),
            _ => None,
        })
        .collect::<Vec<_>>();
    let coercions = if coercions.is_empty() {
        String::new()
    } else {
        coercions.join("\n") + "\n"
    };

    format!(
        r#"const {{ db }} = require('../config/database');

const TABLE = '{table}';
const COLUMNS = {{
{columns}
}};

let ready;
function ensureTable() {{
  if (!ready) {{
    ready = db.schema.hasTable(TABLE).then(async (exists) => {{
      if (exists) return;
      await db.schema.createTable(TABLE, (table) => {{
        table.increments('id');
{definitions}
        table.timestamp('created_at').defaultTo(db.fn.now());
      }});
    }});
  }}
  return ready;
}}

function toRow(fields) {{
  const row = {{}};
  for (const [key, name] of Object.entries(COLUMNS)) {{
    if (key in fields) row[name] = fields[key];
  }}
  if ('id' in fields) row.id = fields.id;
  return row;
}}

function fromRow(row) {{
  if (!row) return null;
  const record = {{ id: row.id }};
  for (const [key, name] of Object.entries(COLUMNS)) record[key] = row[name];
{coercions}  return record;
}}

async function findOne(where) {{
  await ensureTable();
  return fromRow(await db(TABLE).where(toRow(where)).first());
}}

async function create(fields) {{
  await ensureTable();
  const [inserted] = await db(TABLE).insert(toRow(fields)).returning('id');
  // mysql answers with the bare insert id
  const id = typeof inserted === 'object' ? inserted.id : inserted;
  return findOne({{ id }});
}}

async function update(id, changes) {{
  await ensureTable();
  await db(TABLE).where({{ id }}).update(toRow(changes));
  return findOne({{ id }});
}}

async function removeWhere(where) {{
  await ensureTable();
  await db(TABLE).where(toRow(where)).del();
}}
"#,
        table = model.table,
        columns = columns,
        definitions = definitions,
        coercions = coercions,
    )
}

fn document_model(model: &Model) -> String {
    let name = to_upper_camel_case(model.entity);
    let fields = model
        .fields
        .iter()
        .map(|f| {
            let ty = match f.kind {
                Kind::Str => "type: String, required: true",
                Kind::Bool => "type: Boolean, default: false",
                Kind::Int => "type: Number, default: 0",
                Kind::Date => "type: Date, required: true",
                Kind::UserRef => "type: mongoose.Schema.Types.ObjectId, ref: 'User', required: true, index: true",
            };
            let unique = if f.unique { ", unique: true" } else { "" };
            format!("    {}: {{ {}{} }},", f.name, ty, unique)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"const mongoose = require('mongoose');

const schema = new mongoose.Schema(
  {{
{fields}
  }},
  {{ timestamps: true }},
);

const Model = mongoose.models.{name} || mongoose.model('{name}', schema);

function fromDoc(doc) {{
  if (!doc) return null;
  const {{ _id, __v, ...rest }} = doc;
  return {{ ...rest, id: String(_id) }};
}}

function toQuery(where) {{
  const {{ id, ...rest }} = where;
  return id === undefined ? rest : {{ ...rest, _id: id }};
}}

async function findOne(where) {{
  return fromDoc(await Model.findOne(toQuery(where)).lean());
}}

async function create(fields) {{
  const doc = await Model.create(fields);
  return fromDoc(doc.toObject());
}}

async function update(id, changes) {{
  return fromDoc(await Model.findByIdAndUpdate(id, changes, {{ new: true }}).lean());
}}

async function removeWhere(where) {{
  await Model.deleteMany(toQuery(where));
}}
"#,
        fields = fields,
        name = name,
    )
}

fn memory_model(model: &Model) -> String {
    let defaults = model
        .fields
        .iter()
        .filter_map(|f| match f.kind {
            Kind::Bool => Some(format!("{}: false", f.name)),
            Kind::Int => Some(format!("{}: 0", f.name)),
            _ => None,
        })
        .collect::<Vec<_>>();
    let defaults = if defaults.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", defaults.join(", "))
    };

    format!(
        r#"// {name} records live in process memory and vanish on restart
const records = new Map();
let nextId = 1;

const DEFAULTS = {defaults};

function matches(record, where) {{
  return Object.entries(where).every(([key, value]) => String(record[key]) === String(value));
}}

async function findOne(where) {{
  for (const record of records.values()) {{
    if (matches(record, where)) return {{ ...record }};
  }}
  return null;
}}

async function create(fields) {{
  const record = {{ ...DEFAULTS, ...fields, id: String(nextId++), createdAt: new Date() }};
  records.set(record.id, record);
  return {{ ...record }};
}}

async function update(id, changes) {{
  const record = records.get(String(id));
  if (!record) return null;
  Object.assign(record, changes);
  return {{ ...record }};
}}

async function removeWhere(where) {{
  for (const [id, record] of records) {{
    if (matches(record, where)) records.delete(id);
  }}
}}
"#,
        name = to_upper_camel_case(model.entity),
        defaults = defaults,
    )
}

pub fn email_service(variant: &str, config: &ValidConfig) -> Option<String> {
    let provider = EmailProvider::ALL
        .into_iter()
        .find(|p| *p != EmailProvider::None && p.id() == variant)?;

    let transport = match provider {
        EmailProvider::Resend => {
            r#"const { Resend } = require('resend');

let client;

async function deliver({ to, subject, text }) {
  client = client || new Resend(process.env.RESEND_API_KEY);
  const { error } = await client.emails.send({ from: FROM, to, subject, text });
  if (error) throw new Error(error.message);
}
"#
        }
        EmailProvider::Sendgrid => {
            r#"const sgMail = require('@sendgrid/mail');

if (process.env.SENDGRID_API_KEY) {
  sgMail.setApiKey(process.env.SENDGRID_API_KEY);
}

async function deliver({ to, subject, text }) {
  await sgMail.send({ to, from: FROM, subject, text });
}
"#
        }
        EmailProvider::Smtp => {
            r#"const nodemailer = require('nodemailer');

const port = Number(process.env.SMTP_PORT) || 587;
const transporter = nodemailer.createTransport({
  host: process.env.SMTP_HOST,
  port,
  secure: port === 465,
  auth: process.env.SMTP_USER ? { user: process.env.SMTP_USER, pass: process.env.SMTP_PASS } : undefined,
});

async function deliver({ to, subject, text }) {
  await transporter.sendMail({ from: FROM, to, subject, text });
}
"#
        }
        EmailProvider::None => return None,
    };

    let mut out = format!(
        "{}\nconst FROM = process.env.EMAIL_FROM || 'no-reply@example.com';\n\n/** Messages captured instead of delivered while testing */\nconst outbox = [];\n\nasync function sendEmail(message) {{\n  if (process.env.NODE_ENV === 'test') {{\n    outbox.push(message);\n    return;\n  }}\n  await deliver(message);\n}}\n",
        transport
    );

    let mut exports = vec!["sendEmail", "outbox"];
    if config.has(Feature::EmailOtp) {
        out.push_str(&format!(
            r#"
async function sendOtpEmail(to, code) {{
  await sendEmail({{
    to,
    subject: 'Your {name} verification code',
    text: `Your verification code is ${{code}}. It expires in 10 minutes.`,
  }});
}}
"#,
            name = config.project_name()
        ));
        exports.push("sendOtpEmail");
    }
    if config.has(Feature::PasswordReset) {
        out.push_str(&format!(
            r#"
async function sendPasswordResetEmail(to, link) {{
  await sendEmail({{
    to,
    subject: 'Reset your {name} password',
    text: `Follow this link within one hour to choose a new password: ${{link}}`,
  }});
}}
"#,
            name = config.project_name()
        ));
        exports.push("sendPasswordResetEmail");
    }

    out.push_str(&format!("\nmodule.exports = {{ {} }};\n", exports.join(", ")));
    Some(out)
}

pub fn otp_service() -> String {
    r#"const crypto = require('crypto');
const OtpCode = require('../models/OtpCode');
const { sendOtpEmail } = require('./email.service');

const OTP_TTL_MS = 10 * 60 * 1000;
const MAX_ATTEMPTS = 5;

function hashCode(code) {
  return crypto.createHash('sha256').update(String(code)).digest('hex');
}

/** Replace any pending code for `user` and email a fresh one */
async function issueOtp(user) {
  const code = String(crypto.randomInt(0, 1000000)).padStart(6, '0');
  await OtpCode.removeForUser(user.id);
  await OtpCode.create({
    userId: user.id,
    codeHash: hashCode(code),
    expiresAt: new Date(Date.now() + OTP_TTL_MS),
    attempts: 0,
  });
  await sendOtpEmail(user.email, code);
}

async function verifyOtp(user, code) {
  const entry = await OtpCode.findForUser(user.id);
  if (!entry) return false;

  if (new Date(entry.expiresAt).getTime() < Date.now() || entry.attempts >= MAX_ATTEMPTS) {
    await OtpCode.removeForUser(user.id);
    return false;
  }
  if (entry.codeHash !== hashCode(code)) {
    await OtpCode.update(entry.id, { attempts: entry.attempts + 1 });
    return false;
  }

  await OtpCode.removeForUser(user.id);
  return true;
}

module.exports = { issueOtp, verifyOtp };
"#
    .to_string()
}

pub fn password_reset_service() -> String {
    r#"const crypto = require('crypto');
const bcrypt = require('bcryptjs');
const User = require('../models/User');
const ResetToken = require('../models/ResetToken');
const { sendPasswordResetEmail } = require('./email.service');

const RESET_TTL_MS = 60 * 60 * 1000;

function hashToken(token) {
  return crypto.createHash('sha256').update(token).digest('hex');
}

async function requestReset(email) {
  const user = await User.findByEmail(email);
  // Unknown addresses get the same answer as known ones
  if (!user) return;

  const token = crypto.randomBytes(32).toString('hex');
  await ResetToken.removeForUser(user.id);
  await ResetToken.create({
    userId: user.id,
    tokenHash: hashToken(token),
    expiresAt: new Date(Date.now() + RESET_TTL_MS),
  });

  const appUrl = process.env.APP_URL || 'http://localhost:3000';
  await sendPasswordResetEmail(user.email, `${appUrl}/reset-password?token=${token}`);
}

async function resetPassword(token, password) {
  const entry = await ResetToken.findByHash(hashToken(token));
  if (!entry) return false;

  await ResetToken.removeForUser(entry.userId);
  if (new Date(entry.expiresAt).getTime() < Date.now()) return false;

  await User.update(entry.userId, { passwordHash: await bcrypt.hash(password, 10) });
  return true;
}

module.exports = { requestReset, resetPassword };
"#
    .to_string()
}

pub fn auth_schemas(config: &ValidConfig) -> String {
    let mut out = String::from(
        r#"const { z } = require('zod');

const email = z.string().email();
const password = z.string().min(8, 'Password must be at least 8 characters');

const registerSchema = z.object({ email, password });
const loginSchema = z.object({ email, password: z.string().min(1) });
const emailSchema = z.object({ email });
"#,
    );
    let mut exports = vec!["registerSchema", "loginSchema", "emailSchema"];
    if config.has(Feature::EmailOtp) {
        out.push_str("const verifyOtpSchema = z.object({ email, code: z.string().regex(/^\\d{6}$/) });\n");
        exports.push("verifyOtpSchema");
    }
    if config.has(Feature::PasswordReset) {
        out.push_str("const resetPasswordSchema = z.object({ token: z.string().min(1), password });\n");
        exports.push("resetPasswordSchema");
    }
    out.push_str(&format!("\nmodule.exports = {{ {} }};\n", exports.join(", ")));
    out
}

pub fn auth_test(config: &ValidConfig) -> String {
    let otp = config.has(Feature::EmailOtp);

    let mut out = String::from(
        "const request = require('supertest');\nconst { buildServer } = require('../src/app');\n",
    );
    if config.sends_email() {
        out.push_str("const { outbox } = require('../src/services/email.service');\n");
    }
    out.push_str(
        r#"
let server;

beforeAll(async () => {
  server = await buildServer();
});

const credentials = {
  email: `user-${Date.now()}@example.com`,
  password: 'correct-horse-battery',
};

describe('auth', () => {
  it('registers a new account', async () => {
    const res = await request(server).post('/api/auth/register').send(credentials);
    expect(res.status).toBe(201);
    expect(res.body.user.email).toBe(credentials.email);
  });

  it('rejects a duplicate registration', async () => {
    const res = await request(server).post('/api/auth/register').send(credentials);
    expect(res.status).toBe(409);
  });
"#,
    );
    if otp {
        out.push_str(
            r#"
  it('refuses login before the email is verified', async () => {
    const res = await request(server).post('/api/auth/login').send(credentials);
    expect(res.status).toBe(403);
  });

  it('verifies the emailed code', async () => {
    const message = outbox.filter((m) => m.to === credentials.email).pop();
    const code = message.text.match(/\d{6}/)[0];
    const res = await request(server)
      .post('/api/auth/verify-otp')
      .send({ email: credentials.email, code });
    expect(res.status).toBe(200);
    expect(res.body.user.verified).toBe(true);
  });
"#,
        );
    }
    out.push_str(
        r#"
  it('logs in and reads the current user', async () => {
    const login = await request(server).post('/api/auth/login').send(credentials);
    expect(login.status).toBe(200);

    const me = await request(server)
      .get('/api/auth/me')
      .set('Authorization', `Bearer ${login.body.token}`);
    expect(me.status).toBe(200);
    expect(me.body.user.email).toBe(credentials.email);
  });

  it('rejects a wrong password', async () => {
    const res = await request(server)
      .post('/api/auth/login')
      .send({ ...credentials, password: 'wrong-password' });
    expect(res.status).toBe(401);
  });

  it('requires a token for the current user', async () => {
    const res = await request(server).get('/api/auth/me');
    expect(res.status).toBe(401);
  });
"#,
    );
    if config.has(Feature::PasswordReset) {
        out.push_str(
            r#"
  it('emails a reset link', async () => {
    const res = await request(server)
      .post('/api/auth/forgot-password')
      .send({ email: credentials.email });
    expect(res.status).toBe(202);
    expect(outbox.some((m) => m.to === credentials.email && m.text.includes('token='))).toBe(true);
  });
"#,
        );
    }
    out.push_str("});\n");
    out
}
