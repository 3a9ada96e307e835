use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建测验表
        manager
            .create_table(
                Table::create()
                    .table(Quizzes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Quizzes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Quizzes::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::LessonId).big_integer().null())
                    .col(ColumnDef::new(Quizzes::Title).string().not_null())
                    .col(ColumnDef::new(Quizzes::Description).text().null())
                    .col(ColumnDef::new(Quizzes::PassingScore).integer().not_null())
                    .col(ColumnDef::new(Quizzes::TimeLimit).integer().null())
                    .col(ColumnDef::new(Quizzes::MaxAttempts).integer().null())
                    .col(
                        ColumnDef::new(Quizzes::ShuffleQuestions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Quizzes::ShuffleOptions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Quizzes::ShowCorrectAnswers)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Quizzes::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Quizzes::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Quizzes::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建题目表
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Questions::QuizId).big_integer().not_null())
                    .col(ColumnDef::new(Questions::QuestionType).string().not_null())
                    .col(ColumnDef::new(Questions::QuestionText).text().not_null())
                    .col(ColumnDef::new(Questions::Points).integer().not_null())
                    .col(ColumnDef::new(Questions::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(Questions::Explanation).text().null())
                    .col(ColumnDef::new(Questions::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Questions::Table, Questions::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建选项表
        manager
            .create_table(
                Table::create()
                    .table(QuestionOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuestionOptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(QuestionOptions::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuestionOptions::OptionText)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuestionOptions::IsCorrect)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuestionOptions::OrderIndex)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuestionOptions::Table, QuestionOptions::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作答记录表
        manager
            .create_table(
                Table::create()
                    .table(QuizAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizAttempts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizAttempts::QuizId).big_integer().not_null())
                    .col(ColumnDef::new(QuizAttempts::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(QuizAttempts::AttemptNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuizAttempts::StartedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QuizAttempts::CompletedAt).big_integer().null())
                    .col(ColumnDef::new(QuizAttempts::Score).integer().null())
                    .col(ColumnDef::new(QuizAttempts::IsPassed).boolean().null())
                    .col(ColumnDef::new(QuizAttempts::TimeSpent).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuizAttempts::Table, QuizAttempts::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建答案表
        manager
            .create_table(
                Table::create()
                    .table(QuizAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizAnswers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(QuizAnswers::AttemptId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuizAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QuizAnswers::TextAnswer).text().null())
                    .col(
                        ColumnDef::new(QuizAnswers::SelectedOptionId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(QuizAnswers::IsCorrect).boolean().null())
                    .col(
                        ColumnDef::new(QuizAnswers::PointsAwarded)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(QuizAnswers::Feedback).text().null())
                    .col(ColumnDef::new(QuizAnswers::GradedBy).big_integer().null())
                    .col(ColumnDef::new(QuizAnswers::GradedAt).big_integer().null())
                    .col(
                        ColumnDef::new(QuizAnswers::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuizAnswers::Table, QuizAnswers::AttemptId)
                            .to(QuizAttempts::Table, QuizAttempts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuizAnswers::Table, QuizAnswers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 题目表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_questions_quiz_id")
                    .table(Questions::Table)
                    .col(Questions::QuizId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_question_options_question_id")
                    .table(QuestionOptions::Table)
                    .col(QuestionOptions::QuestionId)
                    .to_owned(),
            )
            .await?;

        // 同一用户在同一测验中的作答序号唯一，并发开始作答时只有一个能成功
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_attempts_quiz_user_number")
                    .table(QuizAttempts::Table)
                    .col(QuizAttempts::QuizId)
                    .col(QuizAttempts::UserId)
                    .col(QuizAttempts::AttemptNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每个作答记录中每道题只有一个答案
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_quiz_answers_attempt_question")
                    .table(QuizAnswers::Table)
                    .col(QuizAnswers::AttemptId)
                    .col(QuizAnswers::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(QuizAnswers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuestionOptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quizzes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Quizzes {
    #[sea_orm(iden = "quizzes")]
    Table,
    Id,
    CourseId,
    LessonId,
    Title,
    Description,
    PassingScore,
    TimeLimit,
    MaxAttempts,
    ShuffleQuestions,
    ShuffleOptions,
    ShowCorrectAnswers,
    IsPublished,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Questions {
    #[sea_orm(iden = "questions")]
    Table,
    Id,
    QuizId,
    QuestionType,
    QuestionText,
    Points,
    OrderIndex,
    Explanation,
    CreatedAt,
}

#[derive(DeriveIden)]
enum QuestionOptions {
    #[sea_orm(iden = "question_options")]
    Table,
    Id,
    QuestionId,
    OptionText,
    IsCorrect,
    OrderIndex,
}

#[derive(DeriveIden)]
enum QuizAttempts {
    #[sea_orm(iden = "quiz_attempts")]
    Table,
    Id,
    QuizId,
    UserId,
    AttemptNumber,
    StartedAt,
    CompletedAt,
    Score,
    IsPassed,
    TimeSpent,
}

#[derive(DeriveIden)]
enum QuizAnswers {
    #[sea_orm(iden = "quiz_answers")]
    Table,
    Id,
    AttemptId,
    QuestionId,
    TextAnswer,
    SelectedOptionId,
    IsCorrect,
    PointsAwarded,
    Feedback,
    GradedBy,
    GradedAt,
    CreatedAt,
}
